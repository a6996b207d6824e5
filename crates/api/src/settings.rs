//! Server settings (non-security process configuration).

use std::net::SocketAddr;

use anyhow::Context;
use url::Url;

pub const BIND_ADDR: &str = "BIND_ADDR";
pub const IDENTITY_UPSTREAM_URL: &str = "IDENTITY_UPSTREAM_URL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IDENTITY_UPSTREAM_URL: &str = "http://127.0.0.1:4000";
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub identity_upstream: Url,
    /// Maximum request body forwarded to the identity subsystem.
    pub body_limit: usize,
}

impl ServerSettings {
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("{BIND_ADDR} must be host:port (got '{bind_raw}')"))?;

        let upstream_raw =
            lookup(IDENTITY_UPSTREAM_URL).unwrap_or_else(|| DEFAULT_IDENTITY_UPSTREAM_URL.to_string());
        let identity_upstream = Url::parse(upstream_raw.trim())
            .with_context(|| format!("{IDENTITY_UPSTREAM_URL} is not a valid URL (got '{upstream_raw}')"))?;
        if !matches!(identity_upstream.scheme(), "http" | "https") {
            anyhow::bail!("{IDENTITY_UPSTREAM_URL} must use http or https");
        }

        Ok(Self {
            bind_addr,
            identity_upstream,
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ServerSettings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.bind_addr.port(), 8080);
        assert_eq!(settings.identity_upstream.as_str(), "http://127.0.0.1:4000/");
        assert_eq!(settings.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_bind = ServerSettings::from_lookup(|k| (k == BIND_ADDR).then(|| "nope".to_string()));
        assert!(bad_bind.unwrap_err().to_string().contains(BIND_ADDR));

        let bad_scheme =
            ServerSettings::from_lookup(|k| (k == IDENTITY_UPSTREAM_URL).then(|| "ftp://x".to_string()));
        assert!(bad_scheme.is_err());
    }
}
