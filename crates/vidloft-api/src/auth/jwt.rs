use crate::auth::models::JwtClaims;
use crate::constants::DEFAULT_TOKEN_TTL_SECS;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use vidloft_core::AppError;

/// HS256 bearer-token verifier keyed by the shared `JWT_SECRET`.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::Unauthorized("Invalid token signature".to_string())
                    }
                    _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Mint a token for `user_id` valid for `ttl_secs` (default one hour).
    pub fn issue(&self, user_id: Uuid, ttl_secs: Option<i64>) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id,
            iat: now,
            exp: now + ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-chars-long";

    #[test]
    fn test_issue_and_validate() {
        let verifier = JwtVerifier::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = verifier.issue(user_id, None).unwrap();
        let claims = verifier.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        let token = verifier.issue(Uuid::new_v4(), Some(-120)).unwrap();

        match verifier.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = JwtVerifier::new("another-secret-that-is-also-32-chars-long")
            .issue(Uuid::new_v4(), None)
            .unwrap();
        let err = JwtVerifier::new(SECRET).validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = JwtVerifier::new(SECRET)
            .validate_token("not-a-jwt")
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
