use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use robodash_client::ClientConfig;
use robodash_core::User;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen: String,
    /// SurrealKV directory; `None` keeps everything in memory.
    pub db_dir: Option<PathBuf>,
    pub retrieve_url: String,
    pub classify_url: String,
    pub classify_timeout: Duration,
    /// JSON array of `{username, email}` served by `/api/getUsers`.
    pub users_file: Option<PathBuf>,
}

impl GatewayConfig {
    /// Client settings for the upstream collaborators.
    pub fn upstream(&self) -> ClientConfig {
        let mut cfg = ClientConfig::default();
        cfg.endpoints.retrieve_url = self.retrieve_url.clone();
        cfg.endpoints.classify_url = self.classify_url.clone();
        cfg.endpoints.classify_timeout_secs = self.classify_timeout.as_secs().max(1);
        cfg
    }
}

pub fn load_users(path: &Path) -> Result<Vec<User>> {
    let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let users: Vec<User> =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(users)
}
