use std::any::Any;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use authgate_policy::{ClassifiedError, DenyReason, UpstreamFailure, classify};

/// Stable code for any failure we cannot classify.
pub const INTERNAL_ERROR_CODE: u16 = 5000;

/// Stable code for undecryptable signing-key material.
pub const KEY_MATERIAL_ERROR_CODE: u16 = 5001;

/// `{success: false, error: <message>}` with `status`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

fn coded_error(status: StatusCode, message: &'static str, code: u16) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message,
            "code": code,
        })),
    )
        .into_response()
}

pub fn access_denied(reason: DenyReason) -> Response {
    json_error(StatusCode::FORBIDDEN, reason.message())
}

/// Fixed generic 500. Never carries internal detail.
pub fn internal_error() -> Response {
    coded_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        INTERNAL_ERROR_CODE,
    )
}

/// Response for a panic caught at the outermost layer.
///
/// The payload is logged under an incident id and never echoed to the client.
pub fn panic_to_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    let incident = Uuid::now_v7();
    tracing::error!(%incident, panic = %detail, "request handler panicked");
    internal_error()
}

fn redirect(status: u16, headers: Vec<(String, String)>) -> Response {
    let mut response = StatusCode::from_u16(status)
        .unwrap_or(StatusCode::FOUND)
        .into_response();

    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().append(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping invalid redirect header"),
        }
    }
    response
}

/// Map an identity-subsystem failure to a controlled response.
pub fn upstream_failure_to_response(failure: &UpstreamFailure) -> Response {
    match classify(failure) {
        ClassifiedError::Redirect { status, headers } => redirect(status, headers),
        ClassifiedError::DecryptFailure { message } => {
            let incident = Uuid::now_v7();
            tracing::error!(%incident, %message, "signing key material could not be decrypted");
            coded_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Signing keys unavailable",
                KEY_MATERIAL_ERROR_CODE,
            )
        }
        ClassifiedError::Unknown => {
            let incident = Uuid::now_v7();
            tracing::error!(%incident, ?failure, "unhandled identity failure");
            internal_error()
        }
    }
}
