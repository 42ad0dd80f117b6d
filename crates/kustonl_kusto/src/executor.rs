//! The query executor.

use crate::{AuthSecrets, ConnectionStringBuilder, Connector};
use kustonl_core::{ClusterConfig, Row};
use kustonl_error::{KustoError, KustoErrorKind, KustoResult};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Runs queries against the configured cluster and database.
///
/// Each call builds a connection descriptor, opens a client, runs the query
/// and releases the client before returning, on success and on failure.
#[derive(Clone)]
pub struct QueryExecutor {
    cluster: ClusterConfig,
    secrets: AuthSecrets,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("cluster", &self.cluster)
            .finish_non_exhaustive()
    }
}

impl QueryExecutor {
    /// Executor for `cluster`, authenticating with `secrets`.
    pub fn new(cluster: ClusterConfig, secrets: AuthSecrets, connector: Arc<dyn Connector>) -> Self {
        Self {
            cluster,
            secrets,
            connector,
        }
    }

    /// The cluster configuration in use.
    pub fn cluster(&self) -> &ClusterConfig {
        &self.cluster
    }

    /// Run `query` and return the primary result as rows.
    ///
    /// # Errors
    ///
    /// Fails when no descriptor can be built, when the client reports an
    /// error, or when the response has no result table.
    #[instrument(skip(self, query), fields(database = %self.cluster.database_name))]
    pub async fn execute(&self, query: &str) -> KustoResult<Vec<Row>> {
        info!(
            kusto_uri = %self.cluster.kusto_uri,
            database_name = %self.cluster.database_name,
            authentication_mode = %self.cluster.authentication_mode,
            "Preparing Kusto connection"
        );

        let descriptor = ConnectionStringBuilder::new(&self.secrets)
            .build(&self.cluster.kusto_uri, &self.cluster.authentication_mode)?;

        let client = self.connector.connect(&descriptor).await?;
        let preview: String = query.chars().take(100).collect();
        info!("Executing Kusto query: {}...", preview);

        let response = client.execute(&self.cluster.database_name, query).await?;
        drop(client);
        info!("Query executed successfully.");

        let table = response
            .into_primary_result()
            .ok_or_else(|| KustoError::new(KustoErrorKind::NoPrimaryResult))?;
        let rows = table.into_rows();
        debug!(rows = rows.len(), "Converted primary result");
        Ok(rows)
    }
}
