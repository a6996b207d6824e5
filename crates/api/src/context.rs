use std::sync::Arc;

use authgate_core::ConfigResult;
use authgate_policy::{AdmitReason, ConfigCache, ResolvedSecurityConfig, SecurityVars};

use crate::deferred::DeferredTasks;
use crate::identity::IdentityService;

/// Shared application state.
///
/// The config cache is owned here rather than held globally, so every app (and
/// every test) gets its own memoized configurations.
#[derive(Clone)]
pub struct AppState {
    pub vars: Arc<SecurityVars>,
    pub cache: Arc<ConfigCache>,
    pub identity: Arc<dyn IdentityService>,
    pub deferred: DeferredTasks,
}

impl AppState {
    /// Resolved configuration for this deployment (memoized after first use).
    pub fn security(&self) -> ConfigResult<Arc<ResolvedSecurityConfig>> {
        self.cache.get_or_build(&self.vars)
    }
}

/// How a request was admitted by the access gateway.
///
/// Inserted into request extensions for every request that reaches the
/// identity subsystem.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessContext {
    reason: AdmitReason,
}

impl AccessContext {
    pub fn new(reason: AdmitReason) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> AdmitReason {
        self.reason
    }
}
