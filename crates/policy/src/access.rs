//! Access decision for requests bound for the identity subsystem.
//!
//! - No IO
//! - No panics
//! - Total: every request yields a decision

use crate::config::ResolvedSecurityConfig;
use crate::routes::is_public_route;

/// Request facts the gateway needs, extracted by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub internal_token: Option<&'a str>,
    pub origin: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitReason {
    /// CORS preflight; always forwarded.
    Preflight,
    /// Internal-token enforcement is off for this environment.
    NotEnforced,
    InternalToken,
    TrustedOrigin,
    PublicRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Neither a token nor an `Origin` was presented.
    NotAuthenticated,
    /// A token or `Origin` was presented but did not match.
    NotAuthorized,
}

impl DenyReason {
    /// Client-facing message for the `error` field of the denial body.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Not authenticated",
            Self::NotAuthorized => "Not authorized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Admit(AdmitReason),
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit(_))
    }
}

/// Decide whether `request` may reach the identity subsystem.
///
/// Checks run in order and short-circuit on the first admission: preflight,
/// enforcement off, internal token, trusted origin, public route.
pub fn evaluate(config: &ResolvedSecurityConfig, request: &AccessRequest<'_>) -> AccessDecision {
    if request.method.eq_ignore_ascii_case("OPTIONS") {
        return AccessDecision::Admit(AdmitReason::Preflight);
    }

    let policy = config.access_policy();
    if !policy.enforce_internal {
        return AccessDecision::Admit(AdmitReason::NotEnforced);
    }

    if let (Some(presented), Some(expected)) = (request.internal_token, policy.token.as_deref()) {
        if presented == expected {
            return AccessDecision::Admit(AdmitReason::InternalToken);
        }
    }

    if let Some(origin) = request.origin {
        if config.trusted_origins().is_trusted(origin) {
            return AccessDecision::Admit(AdmitReason::TrustedOrigin);
        }
    }

    if is_public_route(request.path) {
        return AccessDecision::Admit(AdmitReason::PublicRoute);
    }

    let presented_credentials =
        request.internal_token.is_some_and(|t| !t.is_empty()) || request.origin.is_some();
    if presented_credentials {
        AccessDecision::Deny(DenyReason::NotAuthorized)
    } else {
        AccessDecision::Deny(DenyReason::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SecurityVars, build};

    const TOKEN: &str = "internal-token-0123";

    fn production() -> ResolvedSecurityConfig {
        build(&SecurityVars {
            stage: Some("production".to_string()),
            secret: Some("0123456789abcdef0123456789abcdef".to_string()),
            base_url: Some("https://auth.authgate.io".to_string()),
            internal_token: Some(TOKEN.to_string()),
            ..SecurityVars::default()
        })
        .unwrap()
    }

    fn request<'a>(method: &'a str, path: &'a str) -> AccessRequest<'a> {
        AccessRequest {
            method,
            path,
            internal_token: None,
            origin: None,
        }
    }

    #[test]
    fn relaxed_environments_admit_everything() {
        let cfg = build(&SecurityVars::default()).unwrap();
        assert_eq!(
            evaluate(&cfg, &request("POST", "/api/auth/sign-in/email")),
            AccessDecision::Admit(AdmitReason::NotEnforced)
        );
    }

    #[test]
    fn correct_token_admits() {
        let cfg = production();
        let req = AccessRequest {
            internal_token: Some(TOKEN),
            ..request("POST", "/api/auth/admin/list-users")
        };
        assert_eq!(evaluate(&cfg, &req), AccessDecision::Admit(AdmitReason::InternalToken));
    }

    #[test]
    fn token_comparison_is_exact() {
        let cfg = production();
        for presented in ["INTERNAL-TOKEN-0123", " internal-token-0123", "internal-token-012"] {
            let req = AccessRequest {
                internal_token: Some(presented),
                ..request("POST", "/api/auth/session")
            };
            assert_eq!(evaluate(&cfg, &req), AccessDecision::Deny(DenyReason::NotAuthorized));
        }
    }

    #[test]
    fn trusted_origin_admits() {
        let cfg = production();
        let req = AccessRequest {
            origin: Some("https://app.authgate.io"),
            ..request("GET", "/api/auth/get-session")
        };
        assert_eq!(evaluate(&cfg, &req), AccessDecision::Admit(AdmitReason::TrustedOrigin));
    }

    #[test]
    fn untrusted_everything_is_denied() {
        let cfg = production();
        let req = AccessRequest {
            internal_token: Some("wrong-token-000000"),
            origin: Some("https://evil.example"),
            ..request("POST", "/api/auth/sign-in/email")
        };
        let decision = evaluate(&cfg, &req);
        assert_eq!(decision, AccessDecision::Deny(DenyReason::NotAuthorized));
        assert!(!decision.is_admitted());
    }

    #[test]
    fn anonymous_private_route_is_not_authenticated() {
        let cfg = production();
        assert_eq!(
            evaluate(&cfg, &request("GET", "/api/auth/get-session")),
            AccessDecision::Deny(DenyReason::NotAuthenticated)
        );
    }

    #[test]
    fn public_routes_admit_anonymous_requests() {
        let cfg = production();
        for path in ["/api/auth/ok", "/api/auth/jwks", "/api/auth/reset-password/tok"] {
            assert_eq!(
                evaluate(&cfg, &request("GET", path)),
                AccessDecision::Admit(AdmitReason::PublicRoute),
                "{path}"
            );
        }
    }

    #[test]
    fn public_prefix_with_dot_segments_is_not_public() {
        let cfg = production();
        for path in [
            "/api/auth/ok/../admin/list-users",
            "/api/auth/ok/%2e%2e/admin/list-users",
        ] {
            assert_eq!(
                evaluate(&cfg, &request("GET", path)),
                AccessDecision::Deny(DenyReason::NotAuthenticated),
                "{path}"
            );
        }
    }

    #[test]
    fn preflight_is_never_denied() {
        let cfg = production();
        let req = AccessRequest {
            origin: Some("https://evil.example"),
            ..request("options", "/api/auth/sign-in/email")
        };
        assert_eq!(evaluate(&cfg, &req), AccessDecision::Admit(AdmitReason::Preflight));
    }

    #[test]
    fn deny_messages() {
        assert_eq!(DenyReason::NotAuthenticated.message(), "Not authenticated");
        assert_eq!(DenyReason::NotAuthorized.message(), "Not authorized");
    }
}
