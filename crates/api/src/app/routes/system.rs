use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::app::errors;
use crate::context::AppState;

pub async fn health(State(state): State<AppState>) -> axum::response::Response {
    match state.security() {
        Ok(config) => Json(json!({
            "ok": true,
            "environment": config.environment().as_str(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "security configuration unavailable");
            errors::internal_error()
        }
    }
}
