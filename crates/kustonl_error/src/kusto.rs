//! Errors raised while building connections to, authenticating against, or
//! querying the Kusto cluster.

/// Kusto-side error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum KustoErrorKind {
    /// The configured authentication mode tag is not one of the known modes
    #[display("Authentication mode '{}' is not supported", _0)]
    UnsupportedAuthenticationMode(String),

    /// A secret required by the selected authentication mode is not set
    #[display("Required secret {} is not set", _0)]
    MissingSecret(&'static str),

    /// A private key or public certificate file could not be read
    #[display("Failed to load certificate file from {}: {}", path, message)]
    CertificateRead {
        /// Path that was attempted
        path: String,
        /// Underlying I/O error
        message: String,
    },

    /// An access token could not be acquired
    #[display("Credential error: {}", _0)]
    Credential(String),

    /// Transport failure reaching the cluster
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// The cluster rejected the query
    #[display("Query failed with status {}: {}", status, message)]
    Query {
        /// HTTP status code
        status: u16,
        /// Message reported by the service
        message: String,
    },

    /// The response was not a Kusto result set
    #[display("Failed to deserialize response: {}", _0)]
    Deserialization(String),

    /// The response contained no tables
    #[display("Query response contained no primary result table")]
    NoPrimaryResult,
}

/// Kusto error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Kusto Error: {} at line {} in {}", kind, line, file)]
pub struct KustoError {
    /// The error kind
    pub kind: KustoErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl KustoError {
    /// Create a new KustoError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: KustoErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for Kusto operations.
pub type KustoResult<T> = Result<T, KustoError>;
