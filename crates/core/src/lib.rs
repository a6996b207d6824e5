//! `authgate-core` — deployment-stage classification and the configuration error model.
//!
//! This crate contains **pure** primitives shared by the policy and API layers (no I/O).

pub mod environment;
pub mod error;

pub use environment::Environment;
pub use error::{ConfigError, ConfigResult};
