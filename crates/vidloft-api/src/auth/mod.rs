//! Bearer-token identity: HS256 JWT verification and the middleware that
//! attaches the caller identity to each protected request.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtVerifier;
pub use models::{CallerIdentity, JwtClaims};
