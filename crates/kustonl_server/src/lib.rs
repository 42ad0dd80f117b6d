//! HTTP service and CLI for natural-language Kusto queries.
//!
//! A question goes to Azure OpenAI with a KQL system prompt, the KQL found in
//! the answer runs against Azure Data Explorer, and the rows go back to the
//! model for a prose summary.
//!
//! Routes (all `POST`, prompt from the `prompt` query parameter or a JSON
//! body `{"prompt": ...}`):
//!
//! - `/req` runs a fixed debug query and answers `Executed Correctly.`
//! - `/basic_llm_call` answers `{"response": ...}`
//! - `/kusto_nl_query` answers with an [`NlQueryReport`]
//!
//! `GET /health` answers `{"status": "ok"}`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod client;
mod observability;
mod pipeline;
mod report;
mod server;
mod settings;

pub use api::{AppState, create_router};
pub use client::{DEFAULT_SERVICE_URL, ServiceClient};
pub use observability::init_tracing;
pub use pipeline::{NlQueryPipeline, NlQueryReport, STATUS_ERROR, STATUS_SUCCESS, generate_query};
pub use report::{canned_reply, render_report};
pub use server::serve;
pub use settings::{
    DEFAULT_BIND, DEFAULT_CONFIG_PATH, DEFAULT_DEBUG_QUERY, LoggingSettings, ServerSettings,
    Settings, load_cluster_config,
};
