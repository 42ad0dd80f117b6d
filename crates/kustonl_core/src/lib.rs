//! Core data types for kustonl.
//!
//! This crate holds the pieces that do not talk to any external service: the
//! authentication mode tags, the cluster configuration record, the row type
//! returned by queries, the built-in system prompts, and [`extract_kql`], which
//! recovers a KQL statement from free-form model output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod cluster;
mod extract;
mod prompts;
mod row;

pub use auth::AuthenticationMode;
pub use cluster::ClusterConfig;
pub use extract::{QUERY_OPERATOR_TOKENS, extract_kql};
pub use prompts::{KQL_SYSTEM_PROMPT, RESULTS_SUMMARY_SYSTEM_PROMPT, summary_prompt};
pub use row::{Row, rows_from_table};
