//! Secrets supplied through the environment.

use std::path::PathBuf;

/// Microsoft Entra ID authority used when none is configured.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// A string that must not show up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Identity endpoint injected by App Service and Azure Functions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformIdentityEndpoint {
    /// `IDENTITY_ENDPOINT`
    pub endpoint: String,
    /// `IDENTITY_HEADER`, echoed back in `X-IDENTITY-HEADER`
    pub header: Secret,
}

/// Every secret an authentication mode may consult.
///
/// Loaded once at startup; each mode reports the first one it needs but
/// cannot find.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AuthSecrets {
    /// `APP_ID`
    pub app_id: Option<String>,
    /// `APP_KEY`
    pub app_key: Option<Secret>,
    /// `APP_TENANT`
    pub app_tenant: Option<String>,
    /// `PRIVATE_KEY_PEM_FILE_PATH`
    pub private_key_pem_file_path: Option<PathBuf>,
    /// `CERT_THUMBPRINT`
    pub cert_thumbprint: Option<String>,
    /// `PUBLIC_CERT_FILE_PATH`, only for subject-name/issuer (SNI) sign-in
    pub public_cert_file_path: Option<PathBuf>,
    /// `IDENTITY_ENDPOINT` + `IDENTITY_HEADER`
    pub platform_identity: Option<PlatformIdentityEndpoint>,
    /// `AZURE_AUTHORITY_HOST`
    pub authority_host: Option<String>,
}

impl AuthSecrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read secrets through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let platform_identity = match (get("IDENTITY_ENDPOINT"), get("IDENTITY_HEADER")) {
            (Some(endpoint), Some(header)) => Some(PlatformIdentityEndpoint {
                endpoint,
                header: Secret::new(header),
            }),
            _ => None,
        };

        Self {
            app_id: get("APP_ID"),
            app_key: get("APP_KEY").map(Secret::new),
            app_tenant: get("APP_TENANT"),
            private_key_pem_file_path: get("PRIVATE_KEY_PEM_FILE_PATH").map(PathBuf::from),
            cert_thumbprint: get("CERT_THUMBPRINT"),
            public_cert_file_path: get("PUBLIC_CERT_FILE_PATH").map(PathBuf::from),
            platform_identity,
            authority_host: get("AZURE_AUTHORITY_HOST"),
        }
    }

    /// Authority host for client-credential sign-in.
    pub fn authority_host(&self) -> &str {
        self.authority_host
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORITY_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_unset() {
        let secrets = AuthSecrets::from_lookup(|key| match key {
            "APP_ID" => Some("app".to_string()),
            "APP_KEY" => Some(String::new()),
            _ => None,
        });
        assert_eq!(secrets.app_id.as_deref(), Some("app"));
        assert!(secrets.app_key.is_none());
        assert_eq!(secrets.authority_host(), DEFAULT_AUTHORITY_HOST);
    }

    #[test]
    fn test_platform_identity_needs_both_variables() {
        let only_endpoint = AuthSecrets::from_lookup(|key| {
            (key == "IDENTITY_ENDPOINT").then(|| "http://localhost:8081/msi/token".to_string())
        });
        assert!(only_endpoint.platform_identity.is_none());

        let both = AuthSecrets::from_lookup(|key| match key {
            "IDENTITY_ENDPOINT" => Some("http://localhost:8081/msi/token".to_string()),
            "IDENTITY_HEADER" => Some("abc".to_string()),
            _ => None,
        });
        assert_eq!(
            both.platform_identity.map(|p| p.header.expose().to_string()),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secrets = AuthSecrets {
            app_key: Some(Secret::new("hunter2")),
            ..Default::default()
        };
        assert!(!format!("{secrets:?}").contains("hunter2"));
    }
}
