use std::collections::BTreeSet;

use robodash_core::api::{AckList, AckRequest};
use robodash_core::TaskId;

use crate::client::DashboardClient;
use crate::error::{ClientError, Result};

impl DashboardClient {
    fn acks_url(&self, user: &str) -> Result<String> {
        let user = user.trim();
        if user.is_empty() || user.contains('/') {
            return Err(ClientError::InvalidInput(format!("bad user name {user:?}")));
        }
        Ok(self.gateway(&format!("/api/acks/{user}")))
    }

    /// Tasks the user has already dismissed.
    pub async fn fetch_acks(&self, user: &str) -> Result<BTreeSet<TaskId>> {
        let url = self.url_with(&self.acks_url(user)?, &[])?;
        let list: AckList = self.get_json(url).await?;
        Ok(list.task_ids)
    }

    /// Record dismissals; returns the user's full acknowledged set.
    pub async fn acknowledge(&self, user: &str, task_ids: Vec<TaskId>) -> Result<BTreeSet<TaskId>> {
        let url = self.acks_url(user)?;
        let list: AckList = self.post_json(&url, &AckRequest { task_ids }).await?;
        Ok(list.task_ids)
    }
}
