//! Azure OpenAI chat-completion driver.

use crate::{ChatCompletionRequest, ChatCompletionResponse, CompletionDriver};
use async_trait::async_trait;
use kustonl_error::{CompletionError, CompletionErrorKind, CompletionResult, ConfigError};
use tracing::instrument;

/// API version sent when none is configured.
pub const DEFAULT_API_VERSION: &str = "2025-01-01-preview";

/// Connection settings for an Azure OpenAI (AI Foundry) resource.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// Resource key, sent in the `api-key` header
    pub api_key: String,
    /// `api-version` query parameter
    pub api_version: String,
    /// Deployment used when a prompt does not name one
    pub deployment: String,
}

impl std::fmt::Debug for AzureOpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl AzureOpenAiConfig {
    /// Create a configuration with the default API version and deployment.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            deployment: crate::DEFAULT_MODEL.to_string(),
        }
    }

    /// Create config from environment variables
    ///
    /// Reads:
    /// - `AZURE_OPENAI_ENDPOINT` (required)
    /// - `AI_FOUNDRY_API_KEY` (required)
    /// - `AZURE_OPENAI_API_VERSION` (default: "2025-01-01-preview")
    /// - `AZURE_OPENAI_DEPLOYMENT` (default: "gpt-4o-mini")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::new(format!("{key} not set")))
        };

        let mut config = Self::new(
            required("AZURE_OPENAI_ENDPOINT")?,
            required("AI_FOUNDRY_API_KEY")?,
        );
        if let Some(version) = lookup("AZURE_OPENAI_API_VERSION").filter(|v| !v.is_empty()) {
            config.api_version = version;
        }
        if let Some(deployment) = lookup("AZURE_OPENAI_DEPLOYMENT").filter(|v| !v.is_empty()) {
            config.deployment = deployment;
        }
        Ok(config)
    }

    /// Chat completions URL for `deployment`.
    pub fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            deployment,
            self.api_version
        )
    }
}

/// Client for an Azure OpenAI chat-completion deployment.
#[derive(Debug, Clone)]
pub struct AzureOpenAiDriver {
    config: AzureOpenAiConfig,
    client: reqwest::Client,
}

impl AzureOpenAiDriver {
    /// Create a new driver
    #[instrument(skip(config), fields(endpoint = %config.endpoint))]
    pub fn new(config: AzureOpenAiConfig) -> Self {
        tracing::debug!("Creating Azure OpenAI driver");
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Get the driver configuration
    pub fn config(&self) -> &AzureOpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionDriver for AzureOpenAiDriver {
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> CompletionResult<ChatCompletionResponse> {
        let url = self.config.completions_url(&request.model);
        tracing::debug!("Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Request failed: {}", e);
                CompletionError::new(CompletionErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Completion endpoint returned error");
            return Err(CompletionError::new(CompletionErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let envelope: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse response: {}", e);
            CompletionError::new(CompletionErrorKind::Deserialization(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        tracing::debug!(choices = envelope.choices.len(), "Chat completion successful");
        Ok(envelope)
    }

    fn provider_name(&self) -> &'static str {
        "azure-openai"
    }
}
