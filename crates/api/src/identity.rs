//! Identity-subsystem boundary.
//!
//! Credential verification, sessions, OTP and JWKS live behind
//! [`IdentityService`]; this crate only gates and forwards traffic to it.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::LengthLimitError;
use url::Url;

use authgate_policy::{ResolvedSecurityConfig, UpstreamFailure};

use crate::app::errors;
use crate::deferred::DeferredTasks;

/// What the identity subsystem may use while serving one request.
#[derive(Clone)]
pub struct IdentityContext {
    pub config: Arc<ResolvedSecurityConfig>,
    /// Background work (e.g. verification emails) goes here, never inline.
    pub deferred: DeferredTasks,
}

/// The identity subsystem, consumed as an opaque service.
///
/// Failures are returned as [`UpstreamFailure`] and classified at the
/// response boundary.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn handle(&self, request: Request<Body>, ctx: &IdentityContext) -> Result<Response, UpstreamFailure>;
}

/// Hop-by-hop headers that must not be copied between connections.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Drop hop-by-hop headers, including any named in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn exceeds_body_limit(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Forwards identity requests to an upstream identity service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: reqwest::Client,
    upstream: Url,
    body_limit: usize,
}

impl HttpIdentityService {
    pub fn new(upstream: Url, body_limit: usize) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            upstream,
            body_limit,
        })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// Upstream URL carrying the request's path and query unchanged.
    fn target(&self, request: &Request<Body>) -> Url {
        let mut target = self.upstream.clone();
        target.set_path(request.uri().path());
        target.set_query(request.uri().query());
        target
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn handle(&self, request: Request<Body>, _ctx: &IdentityContext) -> Result<Response, UpstreamFailure> {
        let target = self.target(&request);
        let (parts, body) = request.into_parts();
        let body = match axum::body::to_bytes(body, self.body_limit).await {
            Ok(body) => body,
            Err(e) if exceeds_body_limit(&e) => {
                tracing::warn!(limit = self.body_limit, path = parts.uri.path(), "identity request body too large");
                return Ok(errors::json_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"));
            }
            Err(e) => return Err(UpstreamFailure::Error(Box::new(e))),
        };

        let mut headers = parts.headers;
        headers.remove(header::HOST);
        strip_hop_by_hop(&mut headers);

        let upstream = self
            .client
            .request(parts.method, target.as_str())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| UpstreamFailure::Error(Box::new(e)))?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| UpstreamFailure::Error(Box::new(e)))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use authgate_policy::{SecurityVars, build};

    use super::*;

    fn service(body_limit: usize) -> HttpIdentityService {
        // Port 9 (discard): nothing in these tests may reach the network.
        let upstream = Url::parse("http://127.0.0.1:9").unwrap();
        HttpIdentityService::new(upstream, body_limit).unwrap()
    }

    fn context() -> IdentityContext {
        IdentityContext {
            config: Arc::new(build(&SecurityVars::default()).unwrap()),
            deferred: DeferredTasks::new(),
        }
    }

    #[test]
    fn target_keeps_path_and_query_verbatim() {
        let svc = service(1024);
        let req = Request::get("/api/auth/reset-password/abc?callback=%2Fdone")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            svc.target(&req).as_str(),
            "http://127.0.0.1:9/api/auth/reset-password/abc?callback=%2Fdone"
        );

        let bare = Request::get("/api/auth/ok").body(Body::empty()).unwrap();
        assert_eq!(svc.target(&bare).query(), None);
    }

    #[test]
    fn hop_by_hop_headers_are_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close, x-session-hint"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("proxy-connection", HeaderValue::from_static("keep-alive"));
        headers.insert(header::PROXY_AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.insert(header::PROXY_AUTHENTICATE, HeaderValue::from_static("Basic"));
        headers.insert("x-session-hint", HeaderValue::from_static("1"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers[header::COOKIE], "session=abc");
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let svc = service(8);
        let req = Request::post("/api/auth/sign-up/email")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();

        let response = svc.handle(req, &context()).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "error": "Request body too large" }));
    }
}
