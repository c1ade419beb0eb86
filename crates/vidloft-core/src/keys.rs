//! Storage key generation
//!
//! Keys have the form `{orientation}/{id}.{ext}` where `id` is 32 bytes from the
//! operating system CSPRNG, base64url-encoded without padding (43 characters).
//! Uniqueness across concurrent uploads comes from the entropy source alone; there is
//! no shared state and no locking.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::constants::STORAGE_KEY_ENTROPY_BYTES;
use crate::models::Orientation;
use crate::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator;

impl KeyGenerator {
    pub fn new() -> Self {
        Self
    }

    /// `base64url(32 random bytes) + "." + extension`
    pub fn asset_name(&self, extension: &str) -> Result<String, AppError> {
        let mut bytes = [0u8; STORAGE_KEY_ENTROPY_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::Internal(format!("Failed to obtain random bytes: {}", e)))?;

        Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(bytes), extension))
    }

    /// Full storage key namespaced by orientation.
    pub fn storage_key(&self, orientation: Orientation, extension: &str) -> Result<String, AppError> {
        Ok(format!(
            "{}/{}",
            orientation.as_prefix(),
            self.asset_name(extension)?
        ))
    }
}
