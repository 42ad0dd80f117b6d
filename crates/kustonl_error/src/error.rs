//! Top-level error wrapper types.

use crate::{CompletionError, CompletionErrorKind, ConfigError, KustoError, ServerError};

/// Union of every error the service can produce.
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum KustoNlErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Completion endpoint error
    #[from(CompletionError)]
    Completion(CompletionError),
    /// Kusto connection, credential or query error
    #[from(KustoError)]
    Kusto(KustoError),
    /// HTTP service error
    #[from(ServerError)]
    Server(ServerError),
}

/// kustonl error with kind discrimination.
///
/// # Examples
///
/// ```
/// use kustonl_error::{ConfigError, KustoNlError};
///
/// let err: KustoNlError = ConfigError::new("missing key 'databaseName'").into();
/// assert!(!err.is_invalid_input());
/// assert_eq!(err.summary(), "missing key 'databaseName'");
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("kustonl Error: {}", _0)]
pub struct KustoNlError(Box<KustoNlErrorKind>);

impl KustoNlError {
    /// Create a new error from a kind.
    pub fn new(kind: KustoNlErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KustoNlErrorKind {
        &self.0
    }

    /// True when the caller supplied bad input rather than the service failing.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self.kind(),
            KustoNlErrorKind::Completion(CompletionError {
                kind: CompletionErrorKind::EmptyPrompt,
                ..
            })
        )
    }

    /// The error message without its source location, for response bodies.
    pub fn summary(&self) -> String {
        match self.kind() {
            KustoNlErrorKind::Config(e) => e.message.clone(),
            KustoNlErrorKind::Completion(e) => e.kind.to_string(),
            KustoNlErrorKind::Kusto(e) => e.kind.to_string(),
            KustoNlErrorKind::Server(e) => e.kind.to_string(),
        }
    }
}

impl<T> From<T> for KustoNlError
where
    T: Into<KustoNlErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for kustonl operations.
pub type KustoNlResult<T> = std::result::Result<T, KustoNlError>;
