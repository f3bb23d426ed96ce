use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, Endpoints};
use crate::error::{ClientError, Result};

/// One handle for every collaborator. Cheap to clone; clones share the
/// connection pool.
#[derive(Clone, Debug)]
pub struct DashboardClient {
    pub(crate) http: Client,
    pub(crate) endpoints: Endpoints,
    pub(crate) classify_timeout: Duration,
}

impl DashboardClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http(Client::new(), config)
    }

    pub fn with_http(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            endpoints: config.endpoints.clone(),
            classify_timeout: config.classify_timeout(),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn url_with(&self, base: &str, params: &[(&str, &str)]) -> Result<Url> {
        let parsed = if params.is_empty() {
            Url::parse(base)
        } else {
            Url::parse_with_params(base, params)
        };
        parsed.map_err(|e| ClientError::InvalidInput(format!("bad url {base}: {e}")))
    }

    pub(crate) fn gateway(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.gateway_url.trim_end_matches('/'), path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let label = url.to_string();
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&label, e))?;
        decode(&label, resp).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(url, e))?;
        decode(url, resp).await
    }

    /// POST where only the status code matters.
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(url, e))?;
        check_status(url, &resp)
    }
}

fn check_status(url: &str, resp: &Response) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(url: &str, resp: Response) -> Result<T> {
    check_status(url, &resp)?;
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ClientError::from_reqwest(url, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
