//! HTTP API: access gateway, CORS, identity-subsystem boundary and response mapping.

pub mod app;
pub mod context;
pub mod deferred;
pub mod identity;
pub mod middleware;
pub mod settings;
