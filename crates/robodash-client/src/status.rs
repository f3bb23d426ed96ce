use robodash_core::api::{MessageBody, StatusUpdate};
use robodash_core::StatusReport;

use crate::client::DashboardClient;
use crate::error::Result;

impl DashboardClient {
    pub async fn fetch_status(&self) -> Result<StatusReport> {
        let url = self.url_with(&self.gateway("/api/status"), &[])?;
        self.get_json(url).await
    }

    pub async fn post_status(&self, status: &str) -> Result<()> {
        let url = self.gateway("/api/status");
        let _: MessageBody = self
            .post_json(
                &url,
                &StatusUpdate {
                    status: Some(status.to_string()),
                },
            )
            .await?;
        Ok(())
    }
}
