//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Headroom on top of the video ceiling for multipart boundaries and part headers.
///
/// The transport limit is only a backstop; the stager enforces the exact ceiling.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Seconds of validity for tokens minted by `JwtVerifier::issue`.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
