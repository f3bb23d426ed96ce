use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Client settings, usually read from `robodash.toml`. Every field has a
/// default so a partial file is fine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub polling: Polling,
    pub identity: Identity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// `GET ?message=...` retrieval endpoint.
    pub retrieve_url: String,
    /// Command webhook.
    pub webhook_url: String,
    pub classify_url: String,
    /// User listing (normally the gateway's `/api/getUsers`).
    pub directory_url: String,
    /// Base URL of the gateway (status value, acknowledgements).
    pub gateway_url: String,
    pub classify_timeout_secs: u64,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            retrieve_url: "http://127.0.0.1:9000/retrieve".to_string(),
            webhook_url: "http://127.0.0.1:9000/webhook".to_string(),
            classify_url: "http://127.0.0.1:5000/classify".to_string(),
            directory_url: "http://127.0.0.1:8080/api/getUsers".to_string(),
            gateway_url: "http://127.0.0.1:8080".to_string(),
            classify_timeout_secs: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Polling {
    pub status_secs: u64,
    pub tasks_secs: u64,
    pub stations_secs: u64,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            status_secs: 3,
            tasks_secs: 10,
            stations_secs: 10,
        }
    }
}

impl Polling {
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_secs.max(1))
    }

    pub fn tasks(&self) -> Duration {
        Duration::from_secs(self.tasks_secs.max(1))
    }

    pub fn stations(&self) -> Duration {
        Duration::from_secs(self.stations_secs.max(1))
    }
}

/// Signed-in user. Either field may be given; the email is resolved against
/// the directory when the username is missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub email: Option<String>,
    pub username: Option<String>,
}

impl ClientConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading client config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("client config {} is not valid TOML", path.display()))
    }

    /// Like [`load_from`](Self::load_from) but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config, creating missing parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).context("encoding client config")?;
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
                .with_context(|| format!("creating config directory {}", dir.display()))?,
            _ => {}
        }
        std::fs::write(path, text).with_context(|| format!("writing client config {}", path.display()))
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("robodash.toml")
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoints.classify_timeout_secs.max(1))
    }
}
