//! Query clients.

use crate::{QueryResponse, TokenCredential};
use async_trait::async_trait;
use kustonl_error::{KustoError, KustoErrorKind, KustoResult};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Something that can run a KQL query against a database.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run `query` against `database` and return every result table.
    async fn execute(&self, database: &str, query: &str) -> KustoResult<QueryResponse>;
}

/// Client for the Kusto REST query endpoint (`/v1/rest/query`).
///
/// A client is one session with the cluster; it is released when dropped.
pub struct KustoClient {
    cluster_uri: String,
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
}

impl std::fmt::Debug for KustoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KustoClient")
            .field("cluster_uri", &self.cluster_uri)
            .finish_non_exhaustive()
    }
}

impl KustoClient {
    /// Open a session with `cluster_uri`.
    pub fn new(
        cluster_uri: impl Into<String>,
        http: reqwest::Client,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        let cluster_uri = cluster_uri.into().trim_end_matches('/').to_string();
        debug!(cluster = %cluster_uri, "Opening Kusto connection");
        Self {
            cluster_uri,
            http,
            credential,
        }
    }

    /// The cluster this client talks to.
    pub fn cluster_uri(&self) -> &str {
        &self.cluster_uri
    }
}

impl Drop for KustoClient {
    fn drop(&mut self) {
        debug!(cluster = %self.cluster_uri, "Releasing Kusto connection");
    }
}

// Kusto errors look like {"error": {"code": ..., "message": ..., "@message": ...}}.
fn service_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("@message")
                .or_else(|| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl QueryClient for KustoClient {
    #[instrument(skip(self, query), fields(cluster = %self.cluster_uri))]
    async fn execute(&self, database: &str, query: &str) -> KustoResult<QueryResponse> {
        let token = self.credential.get_token(&self.cluster_uri).await?;
        let url = format!("{}/v1/rest/query", self.cluster_uri);
        let request_id = format!("KNL.execute;{}", uuid::Uuid::new_v4());
        debug!(request_id = %request_id, "Submitting query");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.token.expose())
            .header("Accept", "application/json")
            .header("x-ms-client-request-id", &request_id)
            .header("x-ms-app", "kustonl")
            .json(&json!({ "db": database, "csl": query }))
            .send()
            .await
            .map_err(|e| {
                error!("Request failed: {}", e);
                KustoError::new(KustoErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = service_message(&body);
            error!(status = %status, request_id = %request_id, "Query failed: {}", message);
            return Err(KustoError::new(KustoErrorKind::Query {
                status: status.as_u16(),
                message,
            }));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse response: {}", e);
            KustoError::new(KustoErrorKind::Deserialization(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }
}
