//! Error types for the HTTP service.

/// Error kinds for server lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Could not bind the listen address
    #[display("Failed to bind {}", _0)]
    Bind(String),

    /// The server stopped with an error
    #[display("Server error: {}", _0)]
    Serve(String),

    /// Startup configuration was invalid
    #[display("Configuration error: {}", _0)]
    Configuration(String),

    /// A running kustonl service could not be reached or refused the call
    #[display("Service call failed: {}", _0)]
    Remote(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    /// The error kind
    pub kind: ServerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
