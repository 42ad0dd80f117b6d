//! HTTP routes.

use crate::{NlQueryPipeline, STATUS_ERROR};
use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use kustonl_error::KustoNlError;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info};

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pipeline: Arc<NlQueryPipeline>,
    debug_query: Arc<str>,
}

impl AppState {
    /// State serving `pipeline`; `/req` runs `debug_query`.
    pub fn new(pipeline: NlQueryPipeline, debug_query: impl Into<Arc<str>>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            debug_query: debug_query.into(),
        }
    }
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/req", post(debug_request))
        .route("/basic_llm_call", post(basic_llm_call))
        .route("/kusto_nl_query", post(kusto_nl_query))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct PromptParams {
    prompt: Option<String>,
}

// Query parameter first, then the JSON body. An unparseable body counts as
// no prompt.
fn prompt_from_request(params: PromptParams, body: &[u8]) -> String {
    if let Some(prompt) = params.prompt.filter(|p| !p.is_empty()) {
        return prompt;
    }
    if body.is_empty() {
        return String::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value
            .get("prompt")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Err(e) => {
            error!("Failed to parse JSON body: {}", e);
            String::new()
        }
    }
}

fn error_response(err: &KustoNlError, with_status: bool) -> Response {
    error!("Error processing request: {}", err);
    let (code, message) = if err.is_invalid_input() {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid request: {}", err.summary()),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", err.summary()),
        )
    };
    let body = if with_status {
        json!({ "error": message, "status": STATUS_ERROR })
    } else {
        json!({ "error": message })
    };
    (code, Json(body)).into_response()
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn debug_request(State(state): State<AppState>) -> impl IntoResponse {
    info!("Debug query request received");
    match state.pipeline.debug_query(&state.debug_query).await {
        Ok(rows) => info!(rows = rows.len(), "Query executed successfully"),
        Err(e) => error!("Debug query failed: {}", e),
    }
    "Executed Correctly."
}

async fn basic_llm_call(
    State(state): State<AppState>,
    Query(params): Query<PromptParams>,
    body: Bytes,
) -> Response {
    info!("Basic LLM call request received");
    let prompt = prompt_from_request(params, &body);
    match state.pipeline.basic_call(&prompt).await {
        Ok(response) => (StatusCode::OK, Json(json!({ "response": response }))).into_response(),
        Err(e) => error_response(&e, false),
    }
}

async fn kusto_nl_query(
    State(state): State<AppState>,
    Query(params): Query<PromptParams>,
    body: Bytes,
) -> Response {
    info!("Kusto NL query request received");
    let prompt = prompt_from_request(params, &body);
    match state.pipeline.run(&prompt).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e, true),
    }
}
