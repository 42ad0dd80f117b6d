//! Chat-completion invoker for kustonl.
//!
//! The [`Completer`] sends a system/user prompt pair to a chat-completion
//! endpoint with fixed sampling parameters and offers three ways to consume
//! the answer:
//!
//! - [`Completer::envelope`] returns the full provider response
//! - [`Completer::text`] returns the first choice's text
//! - [`Completer::query`] returns the KQL statement extracted from that text
//!
//! The endpoint itself sits behind the [`CompletionDriver`] trait.
//! [`AzureOpenAiDriver`] is the production implementation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kustonl_models::{AzureOpenAiConfig, AzureOpenAiDriver, Completer, CompletionPrompt};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AzureOpenAiConfig::from_env()?;
//! let completer = Completer::new(Arc::new(AzureOpenAiDriver::new(config.clone())))
//!     .with_default_model(config.deployment.clone());
//!
//! let prompt = CompletionPrompt::new("How many storm events were there in Texas?")
//!     .with_system(kustonl_core::KQL_SYSTEM_PROMPT);
//! let kql = completer.query(&prompt).await?;
//! println!("{kql}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod azure;
mod completer;
mod driver;
mod request;
mod response;

pub use azure::{AzureOpenAiConfig, AzureOpenAiDriver, DEFAULT_API_VERSION};
pub use completer::{
    Completer, CompletionPrompt, DEFAULT_MODEL, MAX_OUTPUT_TOKENS, TEMPERATURE,
};
pub use driver::CompletionDriver;
pub use kustonl_error::{CompletionError, CompletionErrorKind, CompletionResult};
pub use request::{ChatCompletionRequest, ChatCompletionRequestBuilder, ChatMessage};
pub use response::{ChatCompletionResponse, Choice, ChoiceMessage, Usage};
