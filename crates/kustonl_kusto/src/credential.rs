//! Bearer-token acquisition.
//!
//! Each credential delegates the sign-in itself to an external party: the
//! hosting platform, Microsoft Entra ID, or the Azure CLI. Certificate
//! sign-in signs its client assertion locally.

use crate::{ConnectionDescriptor, Credential, PlatformIdentityEndpoint, Secret};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use kustonl_error::{KustoError, KustoErrorKind, KustoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// A bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessToken {
    /// The token
    pub token: Secret,
    /// Expiry as Unix seconds, when the issuer reported it
    pub expires_on: Option<u64>,
}

/// Source of bearer tokens for a resource.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a token for `resource` (the cluster URI).
    async fn get_token(&self, resource: &str) -> KustoResult<AccessToken>;
}

fn credential_error(message: String) -> KustoError {
    error!("{}", message);
    KustoError::new(KustoErrorKind::Credential(message))
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

// Token endpoints disagree on whether numbers are strings.
fn unix_seconds(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: Option<Value>,
    #[serde(default)]
    expires_in: Option<Value>,
}

async fn read_oauth_token(response: reqwest::Response) -> KustoResult<AccessToken> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(credential_error(format!(
            "Token endpoint returned {}: {}",
            status, body
        )));
    }

    let parsed: OAuthTokenResponse = response
        .json()
        .await
        .map_err(|e| credential_error(format!("Malformed token response: {}", e)))?;

    let expires_on = unix_seconds(parsed.expires_on.as_ref())
        .or_else(|| unix_seconds(parsed.expires_in.as_ref()).map(|secs| unix_now() + secs));

    Ok(AccessToken {
        token: Secret::new(parsed.access_token),
        expires_on,
    })
}

/// Managed identity through the platform identity endpoint or IMDS.
#[derive(Debug, Clone)]
pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    platform_endpoint: Option<PlatformIdentityEndpoint>,
}

impl ManagedIdentityCredential {
    /// Use `platform_endpoint` when running on App Service or Functions,
    /// the instance metadata service otherwise.
    pub fn new(http: reqwest::Client, platform_endpoint: Option<PlatformIdentityEndpoint>) -> Self {
        Self {
            http,
            platform_endpoint,
        }
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    #[instrument(skip(self))]
    async fn get_token(&self, resource: &str) -> KustoResult<AccessToken> {
        let request = match &self.platform_endpoint {
            Some(platform) => {
                debug!(endpoint = %platform.endpoint, "Using platform identity endpoint");
                self.http
                    .get(&platform.endpoint)
                    .header("X-IDENTITY-HEADER", platform.header.expose())
                    .query(&[("api-version", "2019-08-01"), ("resource", resource)])
            }
            None => {
                debug!("Using instance metadata service");
                self.http
                    .get(IMDS_ENDPOINT)
                    .header("Metadata", "true")
                    .query(&[("api-version", "2018-02-01"), ("resource", resource)])
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| credential_error(format!("Managed identity endpoint unreachable: {}", e)))?;
        read_oauth_token(response).await
    }
}

/// Client-credentials grant with an application secret.
#[derive(Debug, Clone)]
pub struct ClientSecretCredential {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    app_id: String,
    app_key: Secret,
}

impl ClientSecretCredential {
    /// Credential signing in as `app_id` in `tenant_id`.
    pub fn new(
        http: reqwest::Client,
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        app_id: impl Into<String>,
        app_key: Secret,
    ) -> Self {
        Self {
            http,
            authority_host: authority_host.into(),
            tenant_id: tenant_id.into(),
            app_id: app_id.into(),
            app_key,
        }
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    #[instrument(skip(self), fields(app_id = %self.app_id, tenant = %self.tenant_id))]
    async fn get_token(&self, resource: &str) -> KustoResult<AccessToken> {
        let url = token_url(&self.authority_host, &self.tenant_id);
        let scope = format!("{}/.default", resource.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_key.expose()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| credential_error(format!("Authority unreachable: {}", e)))?;
        read_oauth_token(response).await
    }
}

/// Interactive sign-in delegated to the Azure CLI.
///
/// `az login` owns the interactive flow; this credential reads the token the
/// CLI holds for the signed-in account.
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self {
            program: "az".to_string(),
        }
    }
}

impl AzureCliCredential {
    /// Use a specific CLI executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    #[serde(default, rename = "expires_on")]
    expires_on: Option<Value>,
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    #[instrument(skip(self))]
    async fn get_token(&self, resource: &str) -> KustoResult<AccessToken> {
        let output = tokio::process::Command::new(&self.program)
            .args(["account", "get-access-token", "--output", "json", "--resource"])
            .arg(resource)
            .output()
            .await
            .map_err(|e| credential_error(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(credential_error(format!(
                "{} account get-access-token failed: {}. Run 'az login' first.",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let token: CliToken = serde_json::from_slice(&output.stdout)
            .map_err(|e| credential_error(format!("Malformed Azure CLI output: {}", e)))?;
        Ok(AccessToken {
            token: Secret::new(token.access_token),
            expires_on: unix_seconds(token.expires_on.as_ref()),
        })
    }
}

/// Client-credentials grant with a certificate-signed client assertion.
///
/// The assertion is an RS256 JWT carrying the certificate thumbprint in
/// `x5t`. With a public certificate attached, the chain is sent in `x5c` so
/// the authority can validate by subject name and issuer.
#[derive(Debug, Clone)]
pub struct ClientCertificateCredential {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    app_id: String,
    private_key_pem: Secret,
    thumbprint: String,
    public_certificate: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    aud: &'a str,
    iss: &'a str,
    sub: &'a str,
    jti: String,
    nbf: u64,
    iat: u64,
    exp: u64,
}

impl ClientCertificateCredential {
    /// Credential signing in as `app_id` in `tenant_id` with a PEM private key.
    pub fn new(
        http: reqwest::Client,
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        app_id: impl Into<String>,
        private_key_pem: Secret,
        thumbprint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            authority_host: authority_host.into(),
            tenant_id: tenant_id.into(),
            app_id: app_id.into(),
            private_key_pem,
            thumbprint: thumbprint.into(),
            public_certificate: None,
        }
    }

    /// Send the PEM public certificate chain along with each assertion.
    pub fn with_public_certificate(mut self, public_certificate: impl Into<String>) -> Self {
        self.public_certificate = Some(public_certificate.into());
        self
    }

    fn client_assertion(&self, token_url: &str) -> KustoResult<String> {
        let thumbprint: String = self
            .thumbprint
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .collect();
        let thumbprint = hex::decode(thumbprint)
            .map_err(|e| credential_error(format!("Invalid certificate thumbprint: {}", e)))?;

        let mut header = Header::new(Algorithm::RS256);
        header.x5t = Some(URL_SAFE_NO_PAD.encode(thumbprint));
        if let Some(certificate) = &self.public_certificate {
            let chain = certificate_chain(certificate);
            if chain.is_empty() {
                return Err(credential_error(
                    "Public certificate file contains no PEM certificate".to_string(),
                ));
            }
            header.x5c = Some(chain);
        }

        let key = EncodingKey::from_rsa_pem(self.private_key_pem.expose().as_bytes())
            .map_err(|e| credential_error(format!("Invalid private key: {}", e)))?;

        let now = unix_now();
        let claims = AssertionClaims {
            aud: token_url,
            iss: &self.app_id,
            sub: &self.app_id,
            jti: uuid::Uuid::new_v4().to_string(),
            nbf: now,
            iat: now,
            exp: now + 600,
        };
        encode(&header, &claims, &key)
            .map_err(|e| credential_error(format!("Failed to sign client assertion: {}", e)))
    }
}

// Base64 DER bodies of every CERTIFICATE block, in file order.
fn certificate_chain(pem: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current: Option<String> = None;
    for line in pem.lines().map(str::trim) {
        match line {
            "-----BEGIN CERTIFICATE-----" => current = Some(String::new()),
            "-----END CERTIFICATE-----" => chain.extend(current.take()),
            body => {
                if let Some(current) = current.as_mut() {
                    current.push_str(body);
                }
            }
        }
    }
    chain
}

#[async_trait]
impl TokenCredential for ClientCertificateCredential {
    #[instrument(skip(self), fields(app_id = %self.app_id, tenant = %self.tenant_id, sni = self.public_certificate.is_some()))]
    async fn get_token(&self, resource: &str) -> KustoResult<AccessToken> {
        let url = token_url(&self.authority_host, &self.tenant_id);
        let scope = format!("{}/.default", resource.trim_end_matches('/'));
        let assertion = self.client_assertion(&url)?;

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.app_id.as_str()),
                ("client_assertion_type", CLIENT_ASSERTION_TYPE),
                ("client_assertion", assertion.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| credential_error(format!("Authority unreachable: {}", e)))?;
        read_oauth_token(response).await
    }
}

/// Pick the token source for a descriptor.
pub fn credential_for(
    descriptor: &ConnectionDescriptor,
    http: &reqwest::Client,
    authority_host: &str,
) -> Arc<dyn TokenCredential> {
    match &descriptor.credential {
        Credential::Interactive => Arc::new(AzureCliCredential::default()),
        Credential::ManagedIdentity { platform_endpoint } => Arc::new(
            ManagedIdentityCredential::new(http.clone(), platform_endpoint.clone()),
        ),
        Credential::ApplicationKey {
            app_id,
            app_key,
            tenant_id,
        } => Arc::new(ClientSecretCredential::new(
            http.clone(),
            authority_host,
            tenant_id.clone(),
            app_id.clone(),
            app_key.clone(),
        )),
        Credential::ApplicationCertificate {
            app_id,
            tenant_id,
            private_key_pem,
            thumbprint,
        } => Arc::new(ClientCertificateCredential::new(
            http.clone(),
            authority_host,
            tenant_id.clone(),
            app_id.clone(),
            private_key_pem.clone(),
            thumbprint.clone(),
        )),
        Credential::ApplicationCertificateSni {
            app_id,
            tenant_id,
            private_key_pem,
            public_certificate,
            thumbprint,
        } => Arc::new(
            ClientCertificateCredential::new(
                http.clone(),
                authority_host,
                tenant_id.clone(),
                app_id.clone(),
                private_key_pem.clone(),
                thumbprint.clone(),
            )
            .with_public_certificate(public_certificate.clone()),
        ),
    }
}
