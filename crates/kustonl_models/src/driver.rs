//! Seam between the invoker and a concrete completion endpoint.

use crate::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use kustonl_error::CompletionResult;

/// A chat-completion endpoint.
///
/// One call, one blocking round trip: implementations do not retry, stream,
/// or override the provider's timeout.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Send a chat completion request and return the provider envelope.
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> CompletionResult<ChatCompletionResponse>;

    /// Provider name (e.g., "azure-openai").
    fn provider_name(&self) -> &'static str;
}
