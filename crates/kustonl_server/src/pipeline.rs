//! Natural language → KQL → rows → summary.

use crate::Settings;
use kustonl_core::{KQL_SYSTEM_PROMPT, RESULTS_SUMMARY_SYSTEM_PROMPT, Row, summary_prompt};
use kustonl_error::{CompletionError, CompletionErrorKind, KustoNlResult};
use kustonl_kusto::{KustoConnector, QueryExecutor};
use kustonl_models::{AzureOpenAiDriver, Completer, CompletionPrompt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Status reported by a successful `/kusto_nl_query` call.
pub const STATUS_SUCCESS: &str = "success";
/// Status reported by a failed `/kusto_nl_query` call.
pub const STATUS_ERROR: &str = "error";

/// Outcome of one natural-language query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlQueryReport {
    /// The question as asked
    pub prompt: String,
    /// KQL generated for it
    pub generated_query: String,
    /// Primary result rows
    #[serde(default)]
    pub results: Vec<Row>,
    /// Prose summary of the rows
    #[serde(default)]
    pub summarized_results: String,
    /// Always [`STATUS_SUCCESS`] for a completed report
    pub status: String,
}

/// Generate a KQL query for `prompt` using the built-in KQL system prompt.
#[instrument(skip(completer))]
pub async fn generate_query(completer: &Completer, prompt: &str) -> KustoNlResult<String> {
    let request = CompletionPrompt::new(prompt).with_system(KQL_SYSTEM_PROMPT);
    let query = completer.query(&request).await?;
    Ok(query.trim().to_string())
}

/// Composes the completion invoker and the query executor.
#[derive(Debug, Clone)]
pub struct NlQueryPipeline {
    completer: Completer,
    executor: QueryExecutor,
}

impl NlQueryPipeline {
    /// Pipeline over an existing completer and executor.
    pub fn new(completer: Completer, executor: QueryExecutor) -> Self {
        Self {
            completer,
            executor,
        }
    }

    /// Production pipeline: Azure OpenAI plus the Kusto REST API.
    pub fn from_settings(settings: &Settings) -> Self {
        let driver = AzureOpenAiDriver::new(settings.completion.clone());
        let completer = Completer::new(Arc::new(driver))
            .with_default_model(settings.completion.deployment.clone());
        let connector =
            KustoConnector::new().with_authority_host(settings.secrets.authority_host());
        let executor = QueryExecutor::new(
            settings.cluster.clone(),
            settings.secrets.clone(),
            Arc::new(connector),
        );
        Self::new(completer, executor)
    }

    /// The query executor.
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Generate a KQL query for `prompt`.
    pub async fn generate_query(&self, prompt: &str) -> KustoNlResult<String> {
        generate_query(&self.completer, prompt).await
    }

    /// Ask the model to summarise `rows` produced by `query`.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn summarize(&self, query: &str, rows: &[Row]) -> KustoNlResult<String> {
        let request = CompletionPrompt::new(summary_prompt(query, rows))
            .with_system(RESULTS_SUMMARY_SYSTEM_PROMPT);
        let envelope = self.completer.envelope(&request).await?;
        let summary = envelope
            .first_content()
            .ok_or_else(|| CompletionError::new(CompletionErrorKind::EmptyResponse))?;
        Ok(summary.to_string())
    }

    /// Generate, execute and summarise.
    #[instrument(skip(self))]
    pub async fn run(&self, prompt: &str) -> KustoNlResult<NlQueryReport> {
        info!("Processing natural language prompt: {}", prompt);

        let generated_query = self.generate_query(prompt).await?;
        let results = self.executor.execute(&generated_query).await?;
        let summarized_results = self.summarize(&generated_query, &results).await?;

        info!("Generated Kusto query: {}", generated_query);
        info!(rows = results.len(), "Query results received");
        info!("Summarized results: {}", summarized_results);

        Ok(NlQueryReport {
            prompt: prompt.to_string(),
            generated_query,
            results,
            summarized_results,
            status: STATUS_SUCCESS.to_string(),
        })
    }

    /// Send `prompt` without a system prompt and extract the query from the answer.
    #[instrument(skip(self))]
    pub async fn basic_call(&self, prompt: &str) -> KustoNlResult<String> {
        let response = self.completer.query(&CompletionPrompt::new(prompt)).await?;
        info!("LLM response: {}", response);
        Ok(response)
    }

    /// Run a fixed query and return its rows.
    pub async fn debug_query(&self, query: &str) -> KustoNlResult<Vec<Row>> {
        Ok(self.executor.execute(query).await?)
    }
}
