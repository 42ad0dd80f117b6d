//! Process settings, read once at startup.
//!
//! The cluster configuration comes from a JSON (or TOML) file loaded through
//! the `config` crate; everything else comes from environment variables.
//! Every loader has a `from_lookup` form taking the variable source as a
//! closure so tests never touch the process environment.

use config::{Config, File, FileFormat};
use kustonl_core::ClusterConfig;
use kustonl_error::{ConfigError, KustoNlResult};
use kustonl_kusto::AuthSecrets;
use kustonl_models::AzureOpenAiConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Cluster configuration file used when none is named.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
/// Listen address used when none is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:7071";
/// Query run by the `/req` debug endpoint.
pub const DEFAULT_DEBUG_QUERY: &str = "GetTenantVersions |distinct serviceName";

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset, e.g. `info`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingSettings {
    /// Read `KUSTONL_LOG_LEVEL` and `KUSTONL_JSON_LOGS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            level: lookup("KUSTONL_LOG_LEVEL")
                .filter(|level| !level.is_empty())
                .unwrap_or(defaults.level),
            json: lookup("KUSTONL_JSON_LOGS").is_some_and(|v| is_truthy(&v)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerSettings {
    /// Address to listen on
    pub bind: SocketAddr,
    /// Cluster configuration file
    pub config_path: PathBuf,
    /// Query run by `/req`
    pub debug_query: String,
}

impl ServerSettings {
    /// Read `KUSTONL_BIND`, `KUSTONL_CONFIG` and `KUSTONL_DEBUG_QUERY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let bind = get("KUSTONL_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .parse()
            .map_err(|e| ConfigError::new(format!("KUSTONL_BIND '{}' is invalid: {}", bind, e)))?;

        Ok(Self {
            bind,
            config_path: get("KUSTONL_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            debug_query: get("KUSTONL_DEBUG_QUERY")
                .unwrap_or_else(|| DEFAULT_DEBUG_QUERY.to_string()),
        })
    }
}

/// Load the cluster configuration record from `path`.
///
/// Files ending in `.toml` are read as TOML, anything else as JSON.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or when `kustoUri`,
/// `databaseName` or `authenticationMode` is missing.
#[instrument(fields(path = %path.display()))]
pub fn load_cluster_config(path: &Path) -> Result<ClusterConfig, ConfigError> {
    debug!("Loading cluster configuration");

    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => FileFormat::Toml,
        _ => FileFormat::Json,
    };

    let config = Config::builder()
        .add_source(File::from(path).format(format))
        .build()
        .map_err(|e| {
            ConfigError::new(format!(
                "Failed to read configuration from {}: {}",
                path.display(),
                e
            ))
        })?;

    let key = |name: &str| {
        config.get_string(name).map_err(|e| {
            ConfigError::new(format!(
                "{}: missing key '{}' ({})",
                path.display(),
                name,
                e
            ))
        })
    };

    Ok(ClusterConfig::new(
        key("kustoUri")?,
        key("databaseName")?,
        key("authenticationMode")?,
    ))
}

/// Everything the service needs, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Cluster, database and authentication mode
    pub cluster: ClusterConfig,
    /// Completion endpoint
    pub completion: AzureOpenAiConfig,
    /// Secrets for the selected authentication mode
    pub secrets: AuthSecrets,
    /// HTTP listener
    pub server: ServerSettings,
    /// Log output
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load from the process environment and the configured cluster file.
    pub fn load() -> KustoNlResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with a custom variable lookup.
    #[instrument(skip_all)]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> KustoNlResult<Self> {
        let server = ServerSettings::from_lookup(&lookup)?;
        Self::with_server(server, lookup)
    }

    /// Load everything except the listener settings, which are given.
    pub fn with_server(
        server: ServerSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> KustoNlResult<Self> {
        let cluster = load_cluster_config(&server.config_path)?;
        let completion = AzureOpenAiConfig::from_lookup(&lookup)?;
        debug!(
            kusto_uri = %cluster.kusto_uri,
            database = %cluster.database_name,
            completion_endpoint = %completion.endpoint,
            "Settings loaded"
        );

        Ok(Self {
            cluster,
            completion,
            secrets: AuthSecrets::from_lookup(&lookup),
            server,
            logging: LoggingSettings::from_lookup(&lookup),
        })
    }
}
