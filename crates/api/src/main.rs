use std::sync::Arc;

use anyhow::Context;

use authgate_api::{
    deferred::DeferredTasks, identity::HttpIdentityService, settings::ServerSettings,
};
use authgate_policy::SecurityVars;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    authgate_observability::init();

    let settings = ServerSettings::from_env()?;
    let vars = SecurityVars::from_env();
    let deferred = DeferredTasks::new();

    let identity = HttpIdentityService::new(settings.identity_upstream.clone(), settings.body_limit)
        .context("failed to build identity client")?;
    tracing::info!(upstream = %identity.upstream(), "forwarding identity requests");

    let app = authgate_api::app::build_app(vars, Arc::new(identity), deferred.clone())
        .context("invalid security configuration")?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(pending = deferred.in_flight(), "draining deferred tasks");
    deferred.drain().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
