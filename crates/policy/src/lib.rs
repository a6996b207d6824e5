//! `authgate-policy` — environment-scoped security policy (pure, transport-agnostic).
//!
//! Turns raw deployment variables into an immutable [`ResolvedSecurityConfig`],
//! decides whether a request may reach the identity subsystem, and classifies
//! identity-library failures. This crate is intentionally decoupled from HTTP.

pub mod access;
pub mod cache;
pub mod config;
pub mod cookie;
pub mod origins;
pub mod routes;
pub mod secret;
pub mod upstream;

pub use access::{AccessDecision, AccessRequest, AdmitReason, DenyReason, evaluate};
pub use cache::ConfigCache;
pub use config::{AccessPolicy, RateLimit, ResolvedSecurityConfig, SecurityVars, SessionPolicy, build};
pub use origins::{TrustedOriginPattern, TrustedOrigins};
pub use upstream::{ClassifiedError, UpstreamFailure, classify};

pub use authgate_core::{ConfigError, ConfigResult, Environment};
