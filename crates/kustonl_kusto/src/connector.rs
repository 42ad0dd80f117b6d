//! Opening query clients from descriptors.

use crate::{
    ConnectionDescriptor, DEFAULT_AUTHORITY_HOST, KustoClient, QueryClient, TokenCredential,
    credential_for,
};
use async_trait::async_trait;
use kustonl_error::KustoResult;
use std::sync::Arc;
use tracing::instrument;

/// Opens a [`QueryClient`] for a descriptor.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a client session; it is released when the returned box drops.
    async fn connect(&self, descriptor: &ConnectionDescriptor) -> KustoResult<Box<dyn QueryClient>>;
}

/// Connector producing [`KustoClient`]s.
#[derive(Clone)]
pub struct KustoConnector {
    http: reqwest::Client,
    authority_host: String,
    credential: Option<Arc<dyn TokenCredential>>,
}

impl std::fmt::Debug for KustoConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KustoConnector")
            .field("authority_host", &self.authority_host)
            .field("credential_override", &self.credential.is_some())
            .finish()
    }
}

impl Default for KustoConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl KustoConnector {
    /// Connector choosing credentials from each descriptor.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            credential: None,
        }
    }

    /// Sign in against a different Entra ID authority.
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Use `credential` for every connection regardless of descriptor.
    pub fn with_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }
}

#[async_trait]
impl Connector for KustoConnector {
    #[instrument(skip_all, fields(cluster = %descriptor.cluster_uri, credential = descriptor.credential.label()))]
    async fn connect(&self, descriptor: &ConnectionDescriptor) -> KustoResult<Box<dyn QueryClient>> {
        let credential = match &self.credential {
            Some(credential) => credential.clone(),
            None => credential_for(descriptor, &self.http, &self.authority_host),
        };
        Ok(Box::new(KustoClient::new(
            descriptor.cluster_uri.clone(),
            self.http.clone(),
            credential,
        )))
    }
}
