//! Cluster configuration record.

use serde::{Deserialize, Serialize};

/// Contents of the cluster configuration file.
///
/// The authentication mode is kept as the raw tag so an unknown value is
/// reported by the connection builder, which names the offending tag.
///
/// # Examples
///
/// ```
/// use kustonl_core::ClusterConfig;
///
/// let config: ClusterConfig = serde_json::from_str(r#"{
///     "kustoUri": "https://help.kusto.windows.net",
///     "databaseName": "Samples",
///     "authenticationMode": "ManagedIdentity"
/// }"#).unwrap();
/// assert_eq!(config.database_name, "Samples");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Cluster endpoint, e.g. `https://mycluster.westeurope.kusto.windows.net`
    pub kusto_uri: String,
    /// Database queries run against
    pub database_name: String,
    /// One of the [`AuthenticationMode`](crate::AuthenticationMode) tags
    pub authentication_mode: String,
}

impl ClusterConfig {
    /// Create a configuration record.
    pub fn new(
        kusto_uri: impl Into<String>,
        database_name: impl Into<String>,
        authentication_mode: impl Into<String>,
    ) -> Self {
        Self {
            kusto_uri: kusto_uri.into(),
            database_name: database_name.into(),
            authentication_mode: authentication_mode.into(),
        }
    }
}
