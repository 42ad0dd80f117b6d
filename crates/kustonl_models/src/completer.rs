//! The completion invoker.

use crate::{
    ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse, ChatMessage,
    CompletionDriver,
};
use kustonl_error::{CompletionError, CompletionErrorKind, CompletionResult};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Model used when neither the prompt nor the completer names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Sampling temperature; kept low for consistent query generation.
pub const TEMPERATURE: f32 = 0.1;
/// Upper bound on generated tokens.
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// A user prompt with an optional system prompt and model override.
///
/// # Examples
///
/// ```
/// use kustonl_models::CompletionPrompt;
///
/// let prompt = CompletionPrompt::new("count storm events by state")
///     .with_system("You are a Kusto expert.")
///     .with_model("gpt-4o");
/// assert_eq!(prompt.user(), "count storm events by state");
/// assert_eq!(prompt.model().as_deref(), Some("gpt-4o"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, derive_getters::Getters)]
pub struct CompletionPrompt {
    user: String,
    system: Option<String>,
    model: Option<String>,
}

impl CompletionPrompt {
    /// Prompt with only a user message.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            system: None,
            model: None,
        }
    }

    /// Prepend a system message.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Use `model` instead of the completer's default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Sends prompts to a [`CompletionDriver`] with fixed sampling parameters.
#[derive(Clone)]
pub struct Completer {
    driver: Arc<dyn CompletionDriver>,
    default_model: String,
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("provider", &self.driver.provider_name())
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl Completer {
    /// Create a completer using [`DEFAULT_MODEL`].
    pub fn new(driver: Arc<dyn CompletionDriver>) -> Self {
        Self {
            driver,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Replace the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Build the wire request, rejecting an empty user prompt.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionErrorKind::EmptyPrompt`] if the user prompt is empty.
    pub fn request(&self, prompt: &CompletionPrompt) -> CompletionResult<ChatCompletionRequest> {
        if prompt.user().is_empty() {
            return Err(CompletionError::new(CompletionErrorKind::EmptyPrompt));
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system().as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt.user().as_str()));

        ChatCompletionRequestBuilder::default()
            .model(
                prompt
                    .model()
                    .clone()
                    .unwrap_or_else(|| self.default_model.clone()),
            )
            .messages(messages)
            .max_tokens(MAX_OUTPUT_TOKENS)
            .temperature(TEMPERATURE)
            .build()
            .map_err(|e| CompletionError::new(CompletionErrorKind::Builder(e.to_string())))
    }

    /// Send the prompt and return the provider's full response envelope.
    #[instrument(skip_all, fields(provider = self.driver.provider_name()))]
    pub async fn envelope(
        &self,
        prompt: &CompletionPrompt,
    ) -> CompletionResult<ChatCompletionResponse> {
        let request = self.request(prompt)?;
        debug!(model = %request.model, "Invoking completion endpoint");
        self.driver.chat_completion(&request).await
    }

    /// Send the prompt and return the first choice's text.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionErrorKind::EmptyResponse`] if no choice has content.
    #[instrument(skip_all)]
    pub async fn text(&self, prompt: &CompletionPrompt) -> CompletionResult<String> {
        let envelope = self.envelope(prompt).await?;
        envelope
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| CompletionError::new(CompletionErrorKind::EmptyResponse))
    }

    /// Send the prompt and return the KQL statement found in the answer.
    #[instrument(skip_all)]
    pub async fn query(&self, prompt: &CompletionPrompt) -> CompletionResult<String> {
        let text = self.text(prompt).await?;
        info!(response = %text, "LLM response for query generation");
        Ok(kustonl_core::extract_kql(&text))
    }
}
