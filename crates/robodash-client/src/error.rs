use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
            }
        } else {
            ClientError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
