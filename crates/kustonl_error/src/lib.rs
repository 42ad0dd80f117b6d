//! Error types for kustonl.
//!
//! Every concern owns an `*ErrorKind` enum describing what went wrong and a
//! `*Error` wrapper recording where it was raised. Wrappers are built with
//! `#[track_caller]`, so the location is the caller of `new`, not this crate.
//!
//! # Examples
//!
//! ```
//! use kustonl_error::{CompletionError, CompletionErrorKind, KustoNlResult};
//!
//! fn ask(prompt: &str) -> KustoNlResult<String> {
//!     if prompt.is_empty() {
//!         Err(CompletionError::new(CompletionErrorKind::EmptyPrompt))?
//!     }
//!     Ok(prompt.to_uppercase())
//! }
//!
//! let err = ask("").unwrap_err();
//! assert!(err.is_invalid_input());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod completion;
mod config;
mod error;
mod kusto;
mod server;

pub use completion::{CompletionError, CompletionErrorKind, CompletionResult};
pub use config::ConfigError;
pub use error::{KustoNlError, KustoNlErrorKind, KustoNlResult};
pub use kusto::{KustoError, KustoErrorKind, KustoResult};
pub use server::{ServerError, ServerErrorKind};
