use robodash_core::api::{ClassifyRequest, ClassifyResponse};
use robodash_core::{fallback_classify, interpret_service_reply, ClassificationResult};
use tracing::{debug, warn};

use crate::client::DashboardClient;
use crate::error::{ClientError, Result};

impl DashboardClient {
    /// Ask the classification service. Errors for every way the service can
    /// fail to give a usable category, including a timeout.
    pub async fn classify_remote(&self, description: &str) -> Result<ClassificationResult> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ClientError::InvalidInput("empty description".to_string()));
        }
        let url = self.endpoints.classify_url.clone();
        let request = ClassifyRequest {
            description: description.to_string(),
        };

        let outcome = tokio::time::timeout(
            self.classify_timeout,
            self.post_json::<_, ClassifyResponse>(&url, &request),
        )
        .await;
        let reply = match outcome {
            Ok(reply) => reply?,
            Err(_) => return Err(ClientError::Timeout { url }),
        };

        interpret_service_reply(&reply).ok_or_else(|| ClientError::Malformed {
            url,
            reason: format!("unusable category {:?}", reply.category),
        })
    }

    /// Classification that never fails: any service problem falls back to
    /// the local keyword rules.
    pub async fn classify(&self, description: &str) -> ClassificationResult {
        match self.classify_remote(description).await {
            Ok(result) => {
                debug!(category = %result.category, "service classification");
                result
            }
            Err(e) => {
                warn!("classification service unavailable, using keywords: {e}");
                fallback_classify(description)
            }
        }
    }
}
