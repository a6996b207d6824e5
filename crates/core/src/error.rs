//! Configuration error model.

use thiserror::Error;

/// Result type used while resolving security configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal, build-time configuration failure.
///
/// Every variant names the configuration key that was rejected so operators can
/// fix the deployment without reading source. A `ConfigError` aborts
/// configuration construction; no partially-valid configuration is ever used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The signing secret is missing or too short.
    #[error("{key}: {reason}")]
    Secret { key: &'static str, reason: String },

    /// The public base URL is missing or malformed.
    #[error("{key}: {reason}")]
    BaseUrl { key: &'static str, reason: String },

    /// The internal service-to-service token is missing or too short.
    #[error("{key}: {reason}")]
    InternalToken { key: &'static str, reason: String },

    /// The cookie domain override is malformed.
    #[error("{key}: {reason}")]
    CookieDomain { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn secret(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Secret {
            key,
            reason: reason.into(),
        }
    }

    pub fn base_url(key: &'static str, reason: impl Into<String>) -> Self {
        Self::BaseUrl {
            key,
            reason: reason.into(),
        }
    }

    pub fn internal_token(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InternalToken {
            key,
            reason: reason.into(),
        }
    }

    pub fn cookie_domain(key: &'static str, reason: impl Into<String>) -> Self {
        Self::CookieDomain {
            key,
            reason: reason.into(),
        }
    }

    /// The configuration key this error is about.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Secret { key, .. }
            | Self::BaseUrl { key, .. }
            | Self::InternalToken { key, .. }
            | Self::CookieDomain { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_key() {
        let err = ConfigError::base_url("AUTH_BASE_URL", "is required outside local/test");
        assert_eq!(err.key(), "AUTH_BASE_URL");
        assert_eq!(err.to_string(), "AUTH_BASE_URL: is required outside local/test");
    }
}
