use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};

use crate::app::errors;
use crate::context::AppState;
use crate::identity::IdentityContext;

/// Hand an admitted request to the identity subsystem and map its failures.
pub async fn forward(State(state): State<AppState>, req: Request<Body>) -> Response {
    let config = match state.security() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "security configuration unavailable");
            return errors::internal_error();
        }
    };

    let ctx = IdentityContext {
        config,
        deferred: state.deferred.clone(),
    };

    match state.identity.handle(req, &ctx).await {
        Ok(response) => response,
        Err(failure) => errors::upstream_failure_to_response(&failure),
    }
}
