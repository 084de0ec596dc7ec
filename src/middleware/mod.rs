pub mod auth;
pub mod rate_limit;

pub use auth::{require_auth, AuthUser};
pub use rate_limit::{reset_rate_limit_middleware, ResetRateLimiter};
