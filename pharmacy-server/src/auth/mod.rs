//! Authentication and authorization
//!
//! JWT 认证 + 封闭角色枚举的角色门控

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
