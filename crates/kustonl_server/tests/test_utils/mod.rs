//! Test utilities for kustonl_server tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kustonl_core::{ClusterConfig, KQL_SYSTEM_PROMPT, RESULTS_SUMMARY_SYSTEM_PROMPT};
use kustonl_kusto::{
    AuthSecrets, ConnectionDescriptor, Connector, KustoError, KustoErrorKind, KustoResult,
    QueryClient, QueryExecutor, QueryResponse, ResultColumn, ResultTable,
};
use kustonl_models::{
    ChatCompletionRequest, ChatCompletionResponse, Choice, ChoiceMessage, Completer,
    CompletionDriver, CompletionError, CompletionErrorKind, CompletionResult,
};
use kustonl_server::{AppState, NlQueryPipeline};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const GENERATED_QUERY: &str = "GetTenantVersions\n| where sdpStage == 2 and channel == \"Preview\"\n| summarize count() by version";
pub const SUMMARY: &str = "Key Findings: 0.48.1 runs on twice as many tenants as 0.49.0.";

/// Completion driver answering by system prompt.
#[derive(Default)]
pub struct ScriptedDriver {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ChatCompletionRequest>>,
    pub fail_with: Option<CompletionErrorKind>,
}

impl ScriptedDriver {
    pub fn failing(kind: CompletionErrorKind) -> Self {
        Self {
            fail_with: Some(kind),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn envelope(content: String) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-test".to_string(),
        object: "chat.completion".to_string(),
        created: 1_700_000_000,
        model: "gpt-4o-mini".to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChoiceMessage {
                role: "assistant".to_string(),
                content: Some(content),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

#[async_trait]
impl CompletionDriver for ScriptedDriver {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> CompletionResult<ChatCompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(kind) = &self.fail_with {
            return Err(CompletionError::new(kind.clone()));
        }

        let system = request
            .messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str());
        let content = match system {
            Some(KQL_SYSTEM_PROMPT) => format!(
                "Here is the query you asked for:\n\n```kql\n{GENERATED_QUERY}\n```\n\nIt counts tenants per version."
            ),
            Some(RESULTS_SUMMARY_SYSTEM_PROMPT) => SUMMARY.to_string(),
            _ => "Sure:\n```kql\nStormEvents | take 5\n```".to_string(),
        };
        Ok(envelope(content))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Connector whose clients return a fixed outcome.
pub struct MockConnector {
    pub outcome: Result<QueryResponse, KustoErrorKind>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn returning(response: QueryResponse) -> Self {
        Self {
            outcome: Ok(response),
            queries: Arc::default(),
        }
    }

    pub fn failing(kind: KustoErrorKind) -> Self {
        Self {
            outcome: Err(kind),
            queries: Arc::default(),
        }
    }
}

struct MockClient {
    outcome: Result<QueryResponse, KustoErrorKind>,
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        _descriptor: &ConnectionDescriptor,
    ) -> KustoResult<Box<dyn QueryClient>> {
        Ok(Box::new(MockClient {
            outcome: self.outcome.clone(),
            queries: self.queries.clone(),
        }))
    }
}

#[async_trait]
impl QueryClient for MockClient {
    async fn execute(&self, _database: &str, query: &str) -> KustoResult<QueryResponse> {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone().map_err(KustoError::new)
    }
}

pub fn version_counts() -> QueryResponse {
    QueryResponse {
        tables: vec![ResultTable {
            table_name: "Table_0".to_string(),
            columns: vec![ResultColumn::named("version"), ResultColumn::named("count_")],
            rows: vec![
                vec![json!("0.48.1"), json!(10)],
                vec![json!("0.49.0"), json!(5)],
            ],
        }],
    }
}

pub fn cluster() -> ClusterConfig {
    ClusterConfig::new("https://mycluster.kusto.windows.net", "Telemetry", "UserPrompt")
}

pub fn pipeline(driver: Arc<ScriptedDriver>, connector: Arc<MockConnector>) -> NlQueryPipeline {
    NlQueryPipeline::new(
        Completer::new(driver),
        QueryExecutor::new(cluster(), AuthSecrets::default(), connector),
    )
}

pub fn app_state(driver: Arc<ScriptedDriver>, connector: Arc<MockConnector>) -> AppState {
    AppState::new(pipeline(driver, connector), "GetTenantVersions |distinct serviceName")
}
