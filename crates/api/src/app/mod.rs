//! HTTP application wiring (Axum router + state).
//!
//! - `routes/`: HTTP handlers (identity forwarding, system endpoints)
//! - `errors.rs`: consistent error responses and failure classification

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{any, get},
};
use tower_http::catch_panic::CatchPanicLayer;

use authgate_core::ConfigError;
use authgate_policy::{ConfigCache, SecurityVars, routes::IDENTITY_NAMESPACE};

use crate::context::AppState;
use crate::deferred::DeferredTasks;
use crate::identity::IdentityService;
use crate::middleware;

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The security configuration is resolved eagerly so an invalid deployment
/// fails at startup instead of on the first request.
pub fn build_app(
    vars: SecurityVars,
    identity: Arc<dyn IdentityService>,
    deferred: DeferredTasks,
) -> Result<Router, ConfigError> {
    let cache = Arc::new(ConfigCache::new());
    cache.get_or_build(&vars)?;

    let state = AppState {
        vars: Arc::new(vars),
        cache,
        identity,
        deferred,
    };

    // Identity namespace: gated, CORS left to the identity subsystem.
    let identity_routes = Router::new()
        .route(IDENTITY_NAMESPACE, any(routes::identity::forward))
        .route(&format!("{IDENTITY_NAMESPACE}/*rest"), any(routes::identity::forward))
        .layer(from_fn_with_state(state.clone(), middleware::access_gateway));

    // Everything else: plain CORS against the trusted-origin set.
    let public_routes = Router::new()
        .route("/health", get(routes::system::health))
        .layer(from_fn_with_state(state.clone(), middleware::cors_middleware));

    Ok(Router::new()
        .merge(identity_routes)
        .merge(public_routes)
        .layer(CatchPanicLayer::custom(errors::panic_to_response))
        .with_state(state))
}
