//! Trusted browser origins: resolution per environment and `Origin` matching.

use std::collections::BTreeSet;

use authgate_core::Environment;

/// Localhost patterns trusted in `local` and `test` regardless of other input.
pub const LOCALHOST_PATTERNS: [&str; 4] = [
    "http://localhost:*",
    "https://localhost:*",
    "http://127.0.0.1:*",
    "https://127.0.0.1:*",
];

/// Static trusted-origin list per environment.
pub fn default_trusted_origins(env: Environment) -> &'static [&'static str] {
    match env {
        Environment::Local => &["http://localhost:3000"],
        Environment::Test => &[],
        Environment::Dev => &["https://*.dev.authgate.io"],
        Environment::Qa => &["https://*.qa.authgate.io"],
        Environment::Preview => &["https://*.preview.authgate.io"],
        Environment::Production => &["https://*.authgate.io"],
    }
}

/// Split a comma-separated origin list, trimming entries and dropping empty ones.
pub fn parse_origin_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Compute the trusted-origin set.
///
/// A non-empty `explicit` list replaces the environment defaults. Localhost
/// patterns (`local`/`test`) and the patterns derived from `cookie_domain` are
/// merged in whichever list was chosen.
pub fn resolve_trusted_origins(
    env: Environment,
    explicit: &[String],
    cookie_domain: Option<&str>,
) -> BTreeSet<String> {
    let mut origins: BTreeSet<String> = if explicit.is_empty() {
        default_trusted_origins(env).iter().map(|o| o.to_string()).collect()
    } else {
        explicit.iter().cloned().collect()
    };

    if env.is_relaxed() {
        origins.extend(LOCALHOST_PATTERNS.iter().map(|p| p.to_string()));
    }

    if let Some(domain) = cookie_domain {
        let bare = domain.trim_start_matches('.');
        if !bare.is_empty() {
            origins.insert(format!("https://{bare}"));
            origins.insert(format!("https://*.{bare}"));
        }
    }

    origins.retain(|o| !o.trim().is_empty());
    origins
}

/// A parsed browser origin: `scheme://host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

/// Port component of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PortSpec {
    Any,
    Exact(Option<u16>),
}

impl Origin {
    fn parse(raw: &str) -> Option<Self> {
        let (scheme, host, port) = split_origin(raw)?;
        if host.contains('*') {
            return None;
        }
        let port = match port {
            None => None,
            Some(p) => Some(p.parse::<u16>().ok()?),
        };
        Some(Self { scheme, host, port })
    }
}

/// Split `scheme://host[:port]` into lowercase parts. Rejects paths, queries and userinfo.
fn split_origin(raw: &str) -> Option<(String, String, Option<String>)> {
    let raw = raw.trim().to_ascii_lowercase();
    let (scheme, rest) = raw.split_once("://")?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    let scheme_ok = !scheme.is_empty()
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.is_empty() || rest.contains(['/', '?', '#', '@']) {
        return None;
    }

    let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
        // IPv6 literal: [addr]:port
        let (addr, after) = bracketed.split_once(']')?;
        let port = match after {
            "" => None,
            p => Some(p.strip_prefix(':')?.to_string()),
        };
        if addr.is_empty() {
            return None;
        }
        (format!("[{addr}]"), port)
    } else {
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (host.to_string(), Some(port.to_string())),
            None => (rest.to_string(), None),
        };
        if host.is_empty() || host.contains(':') {
            return None;
        }
        (host, port)
    };

    Some((scheme.to_string(), host, port))
}

/// One entry of the trusted-origin set, compiled for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustedOriginPattern {
    /// Literal origin; compared after lowercasing.
    Exact(String),
    /// `scheme://*.domain[:port]`; the wildcard covers exactly one label.
    WildcardSubdomain {
        scheme: String,
        domain: String,
        port: Option<u16>,
    },
    /// `scheme://host:*`; any port (or none) on that host.
    AnyPort { scheme: String, host: String },
}

impl TrustedOriginPattern {
    /// Compile a trusted-origin string. Anything that is not a recognised
    /// wildcard form is kept as a literal.
    pub fn parse(raw: &str) -> Self {
        let literal = || Self::Exact(raw.trim().to_ascii_lowercase());

        let Some((scheme, host, port)) = split_origin(raw) else {
            return literal();
        };

        let port = match port.as_deref() {
            Some("*") => PortSpec::Any,
            Some(p) => match p.parse::<u16>() {
                Ok(n) => PortSpec::Exact(Some(n)),
                Err(_) => return literal(),
            },
            None => PortSpec::Exact(None),
        };

        if let Some(domain) = host.strip_prefix("*.") {
            return match port {
                PortSpec::Exact(port) if !domain.is_empty() && !domain.contains('*') => {
                    Self::WildcardSubdomain {
                        scheme,
                        domain: domain.to_string(),
                        port,
                    }
                }
                _ => literal(),
            };
        }
        if host.contains('*') {
            return literal();
        }

        match port {
            PortSpec::Any => Self::AnyPort { scheme, host },
            PortSpec::Exact(Some(p)) => Self::Exact(format!("{scheme}://{host}:{p}")),
            PortSpec::Exact(None) => Self::Exact(format!("{scheme}://{host}")),
        }
    }

    /// Whether a request's `Origin` header value is covered by this pattern.
    pub fn matches(&self, origin: &str) -> bool {
        let Some(origin) = Origin::parse(origin) else {
            return false;
        };

        match self {
            Self::Exact(literal) => {
                let canonical = match origin.port {
                    Some(p) => format!("{}://{}:{p}", origin.scheme, origin.host),
                    None => format!("{}://{}", origin.scheme, origin.host),
                };
                *literal == canonical
            }
            Self::WildcardSubdomain { scheme, domain, port } => {
                if origin.scheme != *scheme || origin.port != *port {
                    return false;
                }
                origin
                    .host
                    .strip_suffix(domain.as_str())
                    .and_then(|prefix| prefix.strip_suffix('.'))
                    .is_some_and(|label| !label.is_empty() && !label.contains('.'))
            }
            Self::AnyPort { scheme, host } => origin.scheme == *scheme && origin.host == *host,
        }
    }
}

/// Deduplicated trusted-origin set with its compiled patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustedOrigins {
    entries: BTreeSet<String>,
    patterns: Vec<TrustedOriginPattern>,
}

impl TrustedOrigins {
    pub fn new(entries: BTreeSet<String>) -> Self {
        let patterns = entries.iter().map(|e| TrustedOriginPattern::parse(e)).collect();
        Self { entries, patterns }
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    /// Whether `origin` (an `Origin` header value) matches any trusted pattern.
    pub fn is_trusted(&self, origin: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(origin))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_comma_separated_lists() {
        assert_eq!(
            parse_origin_list(Some(" https://a.io, ,https://b.io ,")),
            vec!["https://a.io".to_string(), "https://b.io".to_string()]
        );
        assert!(parse_origin_list(None).is_empty());
    }

    #[test]
    fn explicit_list_replaces_defaults_but_keeps_domain_patterns() {
        let explicit = vec!["https://console.partner.io".to_string()];
        let origins = resolve_trusted_origins(Environment::Dev, &explicit, Some(".dev.authgate.io"));

        assert_eq!(
            origins,
            set(&[
                "https://console.partner.io",
                "https://dev.authgate.io",
                "https://*.dev.authgate.io",
            ])
        );
    }

    #[test]
    fn explicit_list_drops_environment_default() {
        let explicit = vec!["https://console.partner.io".to_string()];
        let origins = resolve_trusted_origins(Environment::Production, &explicit, Some(".custom.io"));
        assert!(!origins.contains("https://*.authgate.io"));
        assert!(origins.contains("https://custom.io"));
        assert!(origins.contains("https://*.custom.io"));
    }

    #[test]
    fn empty_explicit_list_uses_defaults() {
        let origins = resolve_trusted_origins(Environment::Qa, &[], None);
        assert_eq!(origins, set(&["https://*.qa.authgate.io"]));
    }

    #[test]
    fn localhost_patterns_always_present_in_local_and_test() {
        let explicit = vec!["https://x.io".to_string()];
        for env in [Environment::Local, Environment::Test] {
            for list in [&[][..], &explicit[..]] {
                let origins = resolve_trusted_origins(env, list, Some(".example.com"));
                for pattern in LOCALHOST_PATTERNS {
                    assert!(origins.contains(pattern), "{env}: missing {pattern}");
                }
            }
        }
        let deployed = resolve_trusted_origins(Environment::Production, &[], None);
        assert!(LOCALHOST_PATTERNS.iter().all(|p| !deployed.contains(*p)));
    }

    #[test]
    fn blank_entries_are_dropped() {
        let explicit = vec!["  ".to_string(), "https://x.io".to_string()];
        let origins = resolve_trusted_origins(Environment::Qa, &explicit, None);
        assert_eq!(origins, set(&["https://x.io"]));
    }

    #[test]
    fn exact_pattern_matches_case_insensitively() {
        let p = TrustedOriginPattern::parse("https://App.Example.com");
        assert!(p.matches("https://app.example.com"));
        assert!(p.matches("HTTPS://APP.EXAMPLE.COM"));
        assert!(!p.matches("http://app.example.com"));
        assert!(!p.matches("https://app.example.com:8443"));
    }

    #[test]
    fn wildcard_matches_exactly_one_label() {
        let p = TrustedOriginPattern::parse("https://*.example.com");
        assert!(p.matches("https://app.example.com"));
        assert!(!p.matches("https://example.com"));
        assert!(!p.matches("https://a.b.example.com"));
        assert!(!p.matches("https://evilexample.com"));
        assert!(!p.matches("http://app.example.com"));
        assert!(!p.matches("https://app.example.com:444"));
    }

    #[test]
    fn any_port_pattern() {
        let p = TrustedOriginPattern::parse("http://localhost:*");
        assert_eq!(
            p,
            TrustedOriginPattern::AnyPort {
                scheme: "http".to_string(),
                host: "localhost".to_string()
            }
        );
        assert!(p.matches("http://localhost:5173"));
        assert!(p.matches("http://localhost"));
        assert!(!p.matches("https://localhost:5173"));
        assert!(!p.matches("http://localhost.evil.io:5173"));
    }

    #[test]
    fn malformed_origins_never_match() {
        let origins = TrustedOrigins::new(set(&["https://*.example.com", "http://localhost:*"]));
        for origin in ["null", "", "app.example.com", "https://app.example.com/path", "https://u@app.example.com"] {
            assert!(!origins.is_trusted(origin), "{origin}");
        }
        assert!(origins.is_trusted("https://app.example.com"));
        assert!(origins.is_trusted("http://localhost:3000"));
    }

    #[test]
    fn ipv6_literals() {
        let p = TrustedOriginPattern::parse("http://[::1]:*");
        assert!(p.matches("http://[::1]:8080"));
        assert!(!p.matches("http://[::2]:8080"));
    }
}
