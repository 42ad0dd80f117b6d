//! Test utilities for kustonl_kusto tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kustonl_kusto::{
    AccessToken, ConnectionDescriptor, Connector, KustoError, KustoErrorKind, KustoResult,
    QueryClient, QueryResponse, ResultColumn, ResultTable, Secret, TokenCredential,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Log sink shared between a test and its subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

/// Credential handing out a fixed token.
pub struct StaticCredential(pub &'static str);

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(&self, _resource: &str) -> KustoResult<AccessToken> {
        Ok(AccessToken {
            token: Secret::new(self.0),
            expires_on: None,
        })
    }
}

/// The two-row version count table used across tests.
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

/// Shared record of what the mock saw.
#[derive(Default)]
pub struct Recorder {
    pub connects: AtomicUsize,
    pub releases: AtomicUsize,
    pub descriptors: Mutex<Vec<ConnectionDescriptor>>,
    pub queries: Mutex<Vec<(String, String)>>,
}

/// Connector handing out [`MockClient`]s.
pub struct MockConnector {
    pub recorder: Arc<Recorder>,
    pub outcome: Result<QueryResponse, KustoErrorKind>,
}

impl MockConnector {
    pub fn returning(response: QueryResponse) -> Self {
        Self {
            recorder: Arc::new(Recorder::default()),
            outcome: Ok(response),
        }
    }

    pub fn failing(kind: KustoErrorKind) -> Self {
        Self {
            recorder: Arc::new(Recorder::default()),
            outcome: Err(kind),
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> KustoResult<Box<dyn QueryClient>> {
        self.recorder.connects.fetch_add(1, Ordering::SeqCst);
        self.recorder
            .descriptors
            .lock()
            .unwrap()
            .push(descriptor.clone());
        Ok(Box::new(MockClient {
            recorder: self.recorder.clone(),
            outcome: self.outcome.clone(),
        }))
    }
}

/// Client replaying a fixed outcome; counts its own release.
pub struct MockClient {
    recorder: Arc<Recorder>,
    outcome: Result<QueryResponse, KustoErrorKind>,
}

#[async_trait]
impl QueryClient for MockClient {
    async fn execute(&self, database: &str, query: &str) -> KustoResult<QueryResponse> {
        self.recorder
            .queries
            .lock()
            .unwrap()
            .push((database.to_string(), query.to_string()));
        self.outcome.clone().map_err(KustoError::new)
    }
}

impl Drop for MockClient {
    fn drop(&mut self) {
        self.recorder.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Row values as plain JSON for comparisons.
pub fn as_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}
