//! Secret and base-URL validation.

use url::Url;

use authgate_core::{ConfigError, ConfigResult, Environment};

use crate::config::keys;

/// Minimum accepted secret length (in characters).
pub const MIN_SECRET_LEN: usize = 32;

/// Publicly known secret used only by `local` and `test`.
///
/// Never valid anywhere else; [`resolve_secret`] refuses to hand it out for
/// any other environment.
pub const FALLBACK_SECRET: &str = "local-test-only-secret-0000000000000000";

/// Resolve the signing secret for `env`.
///
/// - a candidate of at least [`MIN_SECRET_LEN`] characters is returned unchanged
/// - otherwise `local`/`test` receive [`FALLBACK_SECRET`]
/// - otherwise fails, naming the missing key
pub fn resolve_secret(raw: Option<&str>, env: Environment) -> ConfigResult<String> {
    if let Some(candidate) = raw {
        if candidate.chars().count() >= MIN_SECRET_LEN {
            return Ok(candidate.to_string());
        }
    }

    if env.is_relaxed() {
        tracing::warn!(environment = %env, "{} not set or too short; using public fallback secret", keys::SECRET);
        return Ok(FALLBACK_SECRET.to_string());
    }

    let reason = match raw {
        None => format!("is required in {env} (at least {MIN_SECRET_LEN} characters)"),
        Some(_) => format!("must be at least {MIN_SECRET_LEN} characters in {env}"),
    };
    Err(ConfigError::secret(keys::SECRET, reason))
}

/// Resolve the public base URL for `env`.
///
/// `local`/`test` accept anything (including nothing). Everywhere else the URL
/// must be present, parse, and use `http` or `https`; the trimmed string is returned.
pub fn resolve_base_url(raw: Option<&str>, env: Environment) -> ConfigResult<Option<String>> {
    if env.is_relaxed() {
        return Ok(raw.map(str::to_string));
    }

    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ConfigError::base_url(
            keys::BASE_URL,
            format!("is required in {env}"),
        ));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ConfigError::base_url(keys::BASE_URL, format!("is not a valid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(Some(trimmed.to_string())),
        other => Err(ConfigError::base_url(
            keys::BASE_URL,
            format!("must use http or https (got '{other}')"),
        )),
    }
}
