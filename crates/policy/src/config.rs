//! Resolved security configuration (assembler + static per-environment tables).

use std::time::Duration;

use authgate_core::{ConfigError, ConfigResult, Environment};

use crate::cookie::{normalize_cookie_domain, resolve_cookie_domain, should_enable_cross_subdomain};
use crate::origins::{TrustedOrigins, parse_origin_list, resolve_trusted_origins};
use crate::secret::{resolve_base_url, resolve_secret};

/// Names of the consumed environment variables.
pub mod keys {
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const SECRET: &str = "AUTH_SECRET";
    pub const BASE_URL: &str = "AUTH_BASE_URL";
    pub const INTERNAL_TOKEN: &str = "AUTH_INTERNAL_TOKEN";
    pub const TRUSTED_ORIGINS: &str = "AUTH_TRUSTED_ORIGINS";
    pub const COOKIE_DOMAIN: &str = "AUTH_COOKIE_DOMAIN";
}

/// Minimum internal-token length when enforcement is on.
pub const MIN_INTERNAL_TOKEN_LEN: usize = 16;

/// Raw deployment variables, before any validation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecurityVars {
    pub stage: Option<String>,
    pub secret: Option<String>,
    pub base_url: Option<String>,
    pub internal_token: Option<String>,
    pub trusted_origins: Vec<String>,
    pub cookie_domain: Option<String>,
}

impl SecurityVars {
    /// Read variables through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            stage: lookup(keys::ENVIRONMENT),
            secret: lookup(keys::SECRET),
            base_url: lookup(keys::BASE_URL),
            internal_token: lookup(keys::INTERNAL_TOKEN),
            trusted_origins: parse_origin_list(lookup(keys::TRUSTED_ORIGINS).as_deref()),
            cookie_domain: lookup(keys::COOKIE_DOMAIN),
        }
    }

    /// Read variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn environment(&self) -> Environment {
        Environment::classify(self.stage.as_deref())
    }
}

impl core::fmt::Debug for SecurityVars {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecurityVars")
            .field("stage", &self.stage)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("internal_token", &self.internal_token.as_ref().map(|_| "<redacted>"))
            .field("trusted_origins", &self.trusted_origins)
            .field("cookie_domain", &self.cookie_domain)
            .finish()
    }
}

/// Internal-token enforcement for the identity namespace.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub enforce_internal: bool,
    pub token: Option<String>,
}

impl core::fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessPolicy")
            .field("enforce_internal", &self.enforce_internal)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub window: Duration,
    pub max: u32,
    pub enabled: bool,
}

impl RateLimit {
    /// Rate-limit table per environment.
    pub fn for_environment(env: Environment) -> Self {
        let (max, enabled) = match env {
            Environment::Local => (300, false),
            Environment::Preview => (120, true),
            Environment::Dev => (90, true),
            Environment::Qa => (80, true),
            Environment::Production => (60, true),
            Environment::Test => (60, false),
        };
        Self {
            window: Duration::from_secs(10),
            max,
            enabled,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub expires_in: Duration,
    pub update_age: Duration,
    pub fresh_age: Duration,
}

const DAY: u64 = 24 * 60 * 60;

impl SessionPolicy {
    pub fn for_environment(env: Environment) -> Self {
        let days = if env == Environment::Production { 7 } else { 14 };
        Self {
            expires_in: Duration::from_secs(days * DAY),
            update_age: Duration::from_secs(1800),
            fresh_age: Duration::from_secs(900),
        }
    }
}

/// Immutable security configuration for one environment.
///
/// # Invariants
/// - `secret` is the public fallback only in `local`/`test`.
/// - `base_url` is a valid http(s) URL outside `local`/`test`.
/// - `cookie_domain`, if present, has a leading dot and no wildcard.
/// - `access_policy.enforce_internal` implies a token of at least 16 characters.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecurityConfig {
    cache_key: String,
    environment: Environment,
    secret: String,
    base_url: Option<String>,
    access_policy: AccessPolicy,
    trusted_origins: TrustedOrigins,
    cookie_domain: Option<String>,
    cross_subdomain_cookies: bool,
    rate_limit: RateLimit,
    session_policy: SessionPolicy,
}

impl ResolvedSecurityConfig {
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn access_policy(&self) -> &AccessPolicy {
        &self.access_policy
    }

    pub fn trusted_origins(&self) -> &TrustedOrigins {
        &self.trusted_origins
    }

    pub fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref()
    }

    pub fn cross_subdomain_cookies(&self) -> bool {
        self.cross_subdomain_cookies
    }

    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
    }

    pub fn session_policy(&self) -> SessionPolicy {
        self.session_policy
    }
}

impl core::fmt::Debug for ResolvedSecurityConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolvedSecurityConfig")
            .field("cache_key", &self.cache_key)
            .field("environment", &self.environment)
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("access_policy", &self.access_policy)
            .field("trusted_origins", &self.trusted_origins)
            .field("cookie_domain", &self.cookie_domain)
            .field("cross_subdomain_cookies", &self.cross_subdomain_cookies)
            .field("rate_limit", &self.rate_limit)
            .field("session_policy", &self.session_policy)
            .finish()
    }
}

/// Memoization key for an environment.
pub fn cache_key(env: Environment) -> String {
    format!("auth-config:{env}")
}

/// Build the resolved configuration from raw variables.
///
/// Pure function of its input: either a finished configuration or the first
/// validation failure, never a partially-built value.
pub fn build(vars: &SecurityVars) -> ConfigResult<ResolvedSecurityConfig> {
    let environment = vars.environment();

    let secret = resolve_secret(vars.secret.as_deref(), environment)?;
    let base_url = resolve_base_url(vars.base_url.as_deref(), environment)?;

    let explicit_domain = normalize_cookie_domain(vars.cookie_domain.as_deref())?;
    let cookie_domain = resolve_cookie_domain(environment, explicit_domain);
    let cross_subdomain_cookies = should_enable_cross_subdomain(environment, cookie_domain.as_deref());
    let trusted_origins = TrustedOrigins::new(resolve_trusted_origins(
        environment,
        &vars.trusted_origins,
        cookie_domain.as_deref(),
    ));

    let enforce_internal = !environment.is_relaxed();
    let token = vars
        .internal_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    if enforce_internal {
        match token.as_deref() {
            None => {
                return Err(ConfigError::internal_token(
                    keys::INTERNAL_TOKEN,
                    format!("is required in {environment}"),
                ));
            }
            Some(t) if t.chars().count() < MIN_INTERNAL_TOKEN_LEN => {
                return Err(ConfigError::internal_token(
                    keys::INTERNAL_TOKEN,
                    format!("must be at least {MIN_INTERNAL_TOKEN_LEN} characters in {environment}"),
                ));
            }
            Some(_) => {}
        }
    }

    tracing::info!(
        environment = %environment,
        trusted_origins = trusted_origins.len(),
        cookie_domain = cookie_domain.as_deref().unwrap_or("-"),
        enforce_internal,
        "resolved security configuration"
    );

    Ok(ResolvedSecurityConfig {
        cache_key: cache_key(environment),
        environment,
        secret,
        base_url,
        access_policy: AccessPolicy {
            enforce_internal,
            token,
        },
        trusted_origins,
        cookie_domain,
        cross_subdomain_cookies,
        rate_limit: RateLimit::for_environment(environment),
        session_policy: SessionPolicy::for_environment(environment),
    })
}
