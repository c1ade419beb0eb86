use uuid::Uuid;
use vidloft_api::auth::JwtVerifier;

/// Test JWT secret (must match `helpers::test_config`).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-that-is-at-least-32-characters";

/// A caller with a valid bearer token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn create_test_user() -> TestUser {
    let user_id = Uuid::new_v4();
    let token = JwtVerifier::new(TEST_JWT_SECRET)
        .issue(user_id, None)
        .expect("Failed to issue test token");
    TestUser { user_id, token }
}

pub fn expired_token(user_id: Uuid) -> String {
    JwtVerifier::new(TEST_JWT_SECRET)
        .issue(user_id, Some(-300))
        .expect("Failed to issue test token")
}
