//! Errors raised by the chat-completion invoker.

/// What went wrong while talking to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CompletionErrorKind {
    /// The user prompt was empty or absent. Raised before any network call.
    #[display("User prompt cannot be empty")]
    EmptyPrompt,

    /// Transport failure reaching the endpoint
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// The endpoint answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or provider message
        message: String,
    },

    /// The response body was not a chat completion envelope
    #[display("Failed to deserialize response: {}", _0)]
    Deserialization(String),

    /// The wire request could not be assembled
    #[display("Failed to build request: {}", _0)]
    Builder(String),

    /// The envelope carried no choice with text content
    #[display("Completion response contained no message content")]
    EmptyResponse,
}

/// Completion error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The error kind
    pub kind: CompletionErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for completion operations.
pub type CompletionResult<T> = Result<T, CompletionError>;
