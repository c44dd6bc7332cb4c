//! Middleware del sistema
//!
//! Autenticación JWT con contexto de tenant y CORS.

pub mod auth;
pub mod cors;

pub use auth::{auth_middleware, TenantContext};
pub use cors::cors_layer;
