//! Authentication mode tags.

use serde::{Deserialize, Serialize};

/// How the service authenticates against the Kusto cluster.
///
/// The string form is the tag used in the `authenticationMode` key of the
/// cluster configuration file. Parsing is exact and case-sensitive.
///
/// # Examples
///
/// ```
/// use kustonl_core::AuthenticationMode;
///
/// let mode: AuthenticationMode = "AppKey".parse().unwrap();
/// assert_eq!(mode, AuthenticationMode::AppKey);
/// assert_eq!(AuthenticationMode::UserPrompt.to_string(), "UserPrompt");
/// assert!("appkey".parse::<AuthenticationMode>().is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum AuthenticationMode {
    /// Interactive sign-in by a person
    UserPrompt,
    /// Ambient platform identity (system- or user-assigned)
    ManagedIdentity,
    /// Application id + application secret + tenant
    AppKey,
    /// Application id + tenant + PEM private key + thumbprint, optionally SNI
    AppCertificate,
}

impl AuthenticationMode {
    /// Environment variables consulted by this mode.
    pub fn secret_names(&self) -> &'static [&'static str] {
        match self {
            AuthenticationMode::UserPrompt | AuthenticationMode::ManagedIdentity => &[],
            AuthenticationMode::AppKey => &["APP_ID", "APP_KEY", "APP_TENANT"],
            AuthenticationMode::AppCertificate => &[
                "APP_ID",
                "APP_TENANT",
                "PRIVATE_KEY_PEM_FILE_PATH",
                "CERT_THUMBPRINT",
                "PUBLIC_CERT_FILE_PATH",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_mode_round_trips_through_its_tag() {
        for mode in AuthenticationMode::iter() {
            let tag = mode.to_string();
            assert_eq!(tag.parse::<AuthenticationMode>().ok(), Some(mode));
        }
    }

    #[test]
    fn test_unknown_tags_are_rejected() {
        assert!("Interactive".parse::<AuthenticationMode>().is_err());
        assert!("".parse::<AuthenticationMode>().is_err());
        assert!(" AppKey".parse::<AuthenticationMode>().is_err());
    }

    #[test]
    fn test_secret_names() {
        assert!(AuthenticationMode::ManagedIdentity.secret_names().is_empty());
        assert_eq!(AuthenticationMode::AppKey.secret_names().len(), 3);
        assert!(
            AuthenticationMode::AppCertificate
                .secret_names()
                .contains(&"PUBLIC_CERT_FILE_PATH")
        );
    }
}
