//! Per-process memoization of resolved configurations.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use authgate_core::ConfigResult;

use crate::config::{ResolvedSecurityConfig, SecurityVars, build, cache_key};

/// Lazily populated map from cache key (one per environment tag) to its
/// resolved configuration.
///
/// Entries are never mutated after insertion. Two concurrent first requests may
/// both build the same entry; the first insert wins and both callers observe an
/// identical value.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: RwLock<HashMap<String, Arc<ResolvedSecurityConfig>>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the configuration for `vars`' environment, building it on first use.
    ///
    /// Build failures are not cached; the next call retries.
    pub fn get_or_build(&self, vars: &SecurityVars) -> ConfigResult<Arc<ResolvedSecurityConfig>> {
        let key = cache_key(vars.environment());

        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }

        let built = Arc::new(build(vars)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(key).or_insert(built).clone())
    }

    pub fn get(&self, key: &str) -> Option<Arc<ResolvedSecurityConfig>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
