//! Middleware do sistema: autenticação, CORS e rate limiting

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{AdminUser, AuthenticatedUser};
pub use cors::{cors_middleware, cors_middleware_with_origins};
pub use rate_limit::{rate_limit_middleware, RateLimitState};
