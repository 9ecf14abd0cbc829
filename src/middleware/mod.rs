pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod csrf;
pub mod rate_limit;
pub mod session;

pub use auth::{require_auth, AuthUser};
pub use client_ip::{client_ip_middleware, ClientIp};
pub use cors::{cors_layer, preflight_middleware};
pub use csrf::CsrfGuard;
pub use rate_limit::{rate_limit, RateLimitScope};
pub use session::session_middleware;
