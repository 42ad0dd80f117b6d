//! Configuration error type.

/// Raised when the cluster configuration file or the environment cannot
/// provide a required setting.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What was missing or malformed
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use kustonl_error::ConfigError;
    ///
    /// let err = ConfigError::new("missing key 'kustoUri'");
    /// assert!(err.message.contains("kustoUri"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
