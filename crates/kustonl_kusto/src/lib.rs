//! Azure Data Explorer (Kusto) access for kustonl.
//!
//! - [`ConnectionStringBuilder`] turns a cluster URI and an authentication
//!   mode tag into a [`ConnectionDescriptor`].
//! - [`TokenCredential`] implementations acquire bearer tokens for a
//!   descriptor; the actual sign-in is delegated to the platform identity
//!   endpoint, Microsoft Entra ID, or the Azure CLI.
//! - [`KustoClient`] runs a query over the REST API and [`QueryExecutor`]
//!   ties it all together, returning rows as ordered field maps.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kustonl_core::ClusterConfig;
//! use kustonl_kusto::{AuthSecrets, KustoConnector, QueryExecutor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cluster = ClusterConfig::new("https://help.kusto.windows.net", "Samples", "UserPrompt");
//! let executor = QueryExecutor::new(cluster, AuthSecrets::from_env(), Arc::new(KustoConnector::new()));
//! let rows = executor.execute("StormEvents | take 5").await?;
//! println!("{}", rows.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod connection;
mod connector;
mod credential;
mod executor;
mod response;
mod secrets;

pub use client::{KustoClient, QueryClient};
pub use connection::{ConnectionDescriptor, ConnectionStringBuilder, Credential};
pub use connector::{Connector, KustoConnector};
pub use credential::{
    AccessToken, AzureCliCredential, ClientCertificateCredential, ClientSecretCredential,
    ManagedIdentityCredential, TokenCredential, credential_for,
};
pub use executor::QueryExecutor;
pub use kustonl_error::{KustoError, KustoErrorKind, KustoResult};
pub use response::{QueryResponse, ResultColumn, ResultTable};
pub use secrets::{AuthSecrets, DEFAULT_AUTHORITY_HOST, PlatformIdentityEndpoint, Secret};
