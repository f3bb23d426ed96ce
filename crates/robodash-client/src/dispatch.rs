use robodash_core::api::Command;
use tracing::{info, warn};

use crate::client::DashboardClient;
use crate::error::Result;

impl DashboardClient {
    /// POST a command to the webhook and wait for the answer.
    pub async fn send_command(&self, command: &Command) -> Result<()> {
        let url = self.endpoints.webhook_url.clone();
        self.post_unit(&url, command).await?;
        info!(command = command.name(), "command sent");
        Ok(())
    }

    /// Send in the background. Failures are logged and otherwise ignored; the
    /// caller moves on immediately.
    pub fn fire(&self, command: Command) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_command(&command).await {
                warn!(command = command.name(), "command dispatch failed: {e}");
            }
        })
    }
}
