use robodash_core::{resolve_identity, User};

use crate::client::DashboardClient;
use crate::error::Result;

impl DashboardClient {
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let url = self.url_with(&self.endpoints.directory_url, &[])?;
        self.get_json(url).await
    }

    /// Directory entry for a signed-in email, `None` when nobody matches.
    pub async fn resolve_user(&self, email: &str) -> Result<Option<User>> {
        let users = self.list_users().await?;
        Ok(resolve_identity(&users, email).cloned())
    }
}
