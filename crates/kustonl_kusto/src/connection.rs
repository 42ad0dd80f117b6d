//! Connection descriptors and the builder that dispatches on the
//! authentication mode.

use crate::{AuthSecrets, PlatformIdentityEndpoint, Secret};
use kustonl_core::AuthenticationMode;
use kustonl_error::{KustoError, KustoErrorKind, KustoResult};
use std::path::Path;
use tracing::{debug, error, instrument};

/// How a connection obtains its bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Credential {
    /// A person signs in interactively
    Interactive,
    /// The hosting platform's managed identity
    ManagedIdentity {
        /// App Service / Functions identity endpoint, IMDS when absent
        platform_endpoint: Option<PlatformIdentityEndpoint>,
    },
    /// Application id + secret
    ApplicationKey {
        /// Application (client) id
        app_id: String,
        /// Application secret
        app_key: Secret,
        /// Directory (tenant) id
        tenant_id: String,
    },
    /// Application id + PEM private key + certificate thumbprint
    ApplicationCertificate {
        /// Application (client) id
        app_id: String,
        /// Directory (tenant) id
        tenant_id: String,
        /// PEM-encoded private key
        private_key_pem: Secret,
        /// Certificate thumbprint
        thumbprint: String,
    },
    /// Like [`Credential::ApplicationCertificate`] with the public certificate
    /// sent along for subject-name/issuer validation
    ApplicationCertificateSni {
        /// Application (client) id
        app_id: String,
        /// Directory (tenant) id
        tenant_id: String,
        /// PEM-encoded private key
        private_key_pem: Secret,
        /// PEM-encoded public certificate
        public_certificate: String,
        /// Certificate thumbprint
        thumbprint: String,
    },
}

impl Credential {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Credential::Interactive => "interactive",
            Credential::ManagedIdentity { .. } => "managed-identity",
            Credential::ApplicationKey { .. } => "app-key",
            Credential::ApplicationCertificate { .. } => "app-certificate",
            Credential::ApplicationCertificateSni { .. } => "app-certificate-sni",
        }
    }
}

/// Everything a client needs to open a session with a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionDescriptor {
    /// Cluster endpoint without trailing slash
    pub cluster_uri: String,
    /// How to authenticate
    pub credential: Credential,
}

/// Builds [`ConnectionDescriptor`]s from an authentication mode.
///
/// # Examples
///
/// ```
/// use kustonl_kusto::{AuthSecrets, ConnectionStringBuilder, Credential};
///
/// let secrets = AuthSecrets::default();
/// let descriptor = ConnectionStringBuilder::new(&secrets)
///     .build("https://help.kusto.windows.net/", "UserPrompt")
///     .unwrap();
/// assert_eq!(descriptor.cluster_uri, "https://help.kusto.windows.net");
/// assert_eq!(descriptor.credential, Credential::Interactive);
///
/// assert!(ConnectionStringBuilder::new(&secrets)
///     .build("https://help.kusto.windows.net", "Kerberos")
///     .is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConnectionStringBuilder<'a> {
    secrets: &'a AuthSecrets,
}

impl<'a> ConnectionStringBuilder<'a> {
    /// Builder reading secrets from `secrets`.
    pub fn new(secrets: &'a AuthSecrets) -> Self {
        Self { secrets }
    }

    /// Build a descriptor for the mode named by `tag`.
    ///
    /// # Errors
    ///
    /// Fails (and logs) when the tag is unknown, a required secret is unset,
    /// or a certificate file cannot be read.
    #[instrument(skip(self))]
    pub fn build(&self, cluster_uri: &str, tag: &str) -> KustoResult<ConnectionDescriptor> {
        let mode = tag.parse::<AuthenticationMode>().map_err(|_| {
            error!(
                authentication_mode = %tag,
                "Authentication mode '{}' is not supported", tag
            );
            KustoError::new(KustoErrorKind::UnsupportedAuthenticationMode(
                tag.to_string(),
            ))
        })?;
        self.build_for(cluster_uri, mode)
    }

    /// Build a descriptor for an already-parsed mode.
    pub fn build_for(
        &self,
        cluster_uri: &str,
        mode: AuthenticationMode,
    ) -> KustoResult<ConnectionDescriptor> {
        let credential = match mode {
            AuthenticationMode::UserPrompt => Credential::Interactive,
            AuthenticationMode::ManagedIdentity => Credential::ManagedIdentity {
                platform_endpoint: self.secrets.platform_identity.clone(),
            },
            AuthenticationMode::AppKey => Credential::ApplicationKey {
                app_id: required(self.secrets.app_id.clone(), "APP_ID")?,
                app_key: required(self.secrets.app_key.clone(), "APP_KEY")?,
                tenant_id: required(self.secrets.app_tenant.clone(), "APP_TENANT")?,
            },
            AuthenticationMode::AppCertificate => self.certificate_credential()?,
        };

        debug!(credential = credential.label(), "Built connection descriptor");
        Ok(ConnectionDescriptor {
            cluster_uri: cluster_uri.trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn certificate_credential(&self) -> KustoResult<Credential> {
        let app_id = required(self.secrets.app_id.clone(), "APP_ID")?;
        let tenant_id = required(self.secrets.app_tenant.clone(), "APP_TENANT")?;
        let thumbprint = required(self.secrets.cert_thumbprint.clone(), "CERT_THUMBPRINT")?;
        let pem_path = required(
            self.secrets.private_key_pem_file_path.as_deref(),
            "PRIVATE_KEY_PEM_FILE_PATH",
        )?;
        let private_key_pem = Secret::new(read_certificate_file(pem_path)?);

        match self.secrets.public_cert_file_path.as_deref() {
            Some(cert_path) => Ok(Credential::ApplicationCertificateSni {
                app_id,
                tenant_id,
                private_key_pem,
                public_certificate: read_certificate_file(cert_path)?,
                thumbprint,
            }),
            None => Ok(Credential::ApplicationCertificate {
                app_id,
                tenant_id,
                private_key_pem,
                thumbprint,
            }),
        }
    }
}

fn required<T>(value: Option<T>, name: &'static str) -> KustoResult<T> {
    value.ok_or_else(|| {
        error!(secret = name, "Required secret is not set");
        KustoError::new(KustoErrorKind::MissingSecret(name))
    })
}

fn read_certificate_file(path: &Path) -> KustoResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to load certificate file");
        KustoError::new(KustoErrorKind::CertificateRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })
}
