//! Cross-subdomain cookie domain policy.

use authgate_core::{ConfigError, ConfigResult, Environment};

use crate::config::keys;

/// Normalize an explicit cookie domain.
///
/// Trims and lowercases; blank input is treated as absent. The result always
/// contains a `.`, never contains `*`, carries a leading dot and has no empty
/// labels after it.
pub fn normalize_cookie_domain(raw: Option<&str>) -> ConfigResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let domain = raw.trim().to_lowercase();
    if domain.is_empty() {
        return Ok(None);
    }
    if domain.contains('*') {
        return Err(ConfigError::cookie_domain(
            keys::COOKIE_DOMAIN,
            format!("must not contain wildcards (got '{domain}')"),
        ));
    }
    if !domain.contains('.') {
        return Err(ConfigError::cookie_domain(
            keys::COOKIE_DOMAIN,
            format!("must contain at least one '.' (got '{domain}')"),
        ));
    }

    let host = domain.strip_prefix('.').unwrap_or(&domain);
    if host.split('.').any(str::is_empty) {
        return Err(ConfigError::cookie_domain(
            keys::COOKIE_DOMAIN,
            format!("must not contain empty labels (got '{domain}')"),
        ));
    }
    Ok(Some(format!(".{host}")))
}

/// Static cookie domain per environment (already normalized).
pub fn default_cookie_domain(env: Environment) -> Option<&'static str> {
    match env {
        Environment::Local | Environment::Test => None,
        Environment::Dev => Some(".dev.authgate.io"),
        Environment::Qa => Some(".qa.authgate.io"),
        Environment::Preview => Some(".preview.authgate.io"),
        Environment::Production => Some(".authgate.io"),
    }
}

/// Pick the cookie domain: a normalized explicit override wins, then the
/// environment default.
pub fn resolve_cookie_domain(env: Environment, explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| default_cookie_domain(env).map(str::to_string))
}

/// Cross-subdomain cookies are only issued by deployed environments that have a domain.
pub fn should_enable_cross_subdomain(env: Environment, domain: Option<&str>) -> bool {
    let deployed = matches!(
        env,
        Environment::Preview | Environment::Dev | Environment::Qa | Environment::Production
    );
    deployed && domain.is_some()
}
