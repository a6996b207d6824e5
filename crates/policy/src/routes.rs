//! Identity route namespace and the public-route allowlist.

/// Path prefix owned by the identity subsystem.
pub const IDENTITY_NAMESPACE: &str = "/api/auth";

/// Header carrying the internal service-to-service token.
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Identity routes reachable without internal token or trusted origin.
pub const PUBLIC_ROUTES: &[&str] = &[
    // health check
    "/api/auth/ok",
    "/api/auth/jwks",
    // OpenAPI reference page and schema generation
    "/api/auth/reference",
    "/api/auth/open-api/generate-schema",
    // token-bearing recovery flows
    "/api/auth/verify-email",
    "/api/auth/request-password-reset",
    "/api/auth/reset-password",
];

/// `path` has a `.` or `..` segment, literal or percent-encoded.
///
/// Backslashes count as separators: URL parsers treat them as `/` for http(s).
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// `path` is a public route itself or a sub-path of one (`/reset-password/<token>`).
///
/// Paths with dot segments are never public, since they may resolve outside
/// the route they appear to name.
pub fn is_public_route(path: &str) -> bool {
    if has_dot_segment(path) {
        return false;
    }
    PUBLIC_ROUTES.iter().any(|route| {
        path.strip_prefix(route)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
