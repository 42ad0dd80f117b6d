//! Client for a running kustonl service, as used by chat front ends.

use crate::{NlQueryReport, canned_reply, render_report};
use kustonl_error::{KustoNlResult, ServerError, ServerErrorKind};
use tracing::{debug, instrument};

/// Service URL used when none is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:7071";

/// Talks to `/kusto_nl_query` on a running service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    base_url: String,
    http: reqwest::Client,
}

impl ServiceClient {
    /// Client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Run `prompt` on the service and return the report.
    ///
    /// The prompt travels as a query parameter.
    #[instrument(skip(self), fields(service = %self.base_url))]
    pub async fn query(&self, prompt: &str) -> KustoNlResult<NlQueryReport> {
        let url = format!("{}/kusto_nl_query", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("prompt", prompt)])
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ServerError::new(ServerErrorKind::Remote(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %body, "Service returned an error");
            return Err(ServerError::new(ServerErrorKind::Remote(format!(
                "{}: {}",
                status, body
            )))
            .into());
        }

        Ok(response
            .json()
            .await
            .map_err(|e| ServerError::new(ServerErrorKind::Remote(e.to_string())))?)
    }

    /// Answer a chat message: canned replies for commands, otherwise the
    /// rendered report.
    pub async fn ask(&self, message: &str) -> KustoNlResult<String> {
        if let Some(reply) = canned_reply(message) {
            return Ok(reply.to_string());
        }
        let report = self.query(message).await?;
        Ok(render_report(&report))
    }
}
