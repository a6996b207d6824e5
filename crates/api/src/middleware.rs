use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use authgate_policy::{AccessDecision, AccessRequest, evaluate, routes::INTERNAL_TOKEN_HEADER};

use crate::app::errors;
use crate::context::{AccessContext, AppState};

const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Access gateway for the identity namespace.
///
/// Admits or rejects with a 403 JSON body; never sets `Access-Control-*`
/// headers (the identity subsystem owns CORS for its own routes).
pub async fn access_gateway(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let config = match state.security() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "security configuration unavailable");
            return errors::internal_error();
        }
    };

    let decision = {
        let headers = req.headers();
        evaluate(
            &config,
            &AccessRequest {
                method: req.method().as_str(),
                path: req.uri().path(),
                internal_token: header_str(headers, INTERNAL_TOKEN_HEADER),
                origin: header_str(headers, header::ORIGIN.as_str()),
            },
        )
    };

    match decision {
        AccessDecision::Admit(reason) => {
            tracing::debug!(method = %req.method(), path = req.uri().path(), ?reason, "identity request admitted");
            req.extensions_mut().insert(AccessContext::new(reason));
            next.run(req).await
        }
        AccessDecision::Deny(reason) => {
            tracing::warn!(method = %req.method(), path = req.uri().path(), ?reason, "identity request rejected");
            errors::access_denied(reason)
        }
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("origin"));
}

/// CORS for non-identity routes, keyed off the same trusted-origin set.
///
/// Trusted origins are reflected; preflights from them are answered with 204.
/// Untrusted or absent origins get no CORS headers and are processed normally.
pub async fn cors_middleware(
    State(state): State<AppState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let trusted_origin = req.headers().get(header::ORIGIN).and_then(|origin| {
        let value = origin.to_str().ok()?;
        match state.security() {
            Ok(config) if config.trusted_origins().is_trusted(value) => Some(origin.clone()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "security configuration unavailable; skipping CORS");
                None
            }
        }
    });

    let Some(origin) = trusted_origin else {
        return next.run(req).await;
    };

    if req.method() == Method::OPTIONS {
        let requested_headers = req
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();

        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        apply_cors_headers(headers, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        if let Some(requested) = requested_headers {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
        }
        return response;
    }

    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut(), origin);
    response
}
