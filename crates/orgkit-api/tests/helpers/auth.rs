//! JWT minting for tests: tokens signed with the same secret the test config
//! hands to the app.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use orgkit_api::auth::JwtClaims;
use uuid::Uuid;

/// Test signing secret (must match the test config's jwt_secret).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// A test identity: stable subject id plus a bearer token for it.
pub struct TestUser {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

/// Mint a token for a fresh user identity.
pub fn test_user(email: &str) -> TestUser {
    let user_id = Uuid::new_v4();
    TestUser {
        user_id,
        email: email.to_string(),
        token: mint_token(user_id, email, None),
    }
}

/// Mint a signed JWT for the given identity, optionally pinned to an
/// organization.
pub fn mint_token(user_id: Uuid, email: &str, org: Option<Uuid>) -> String {
    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id,
        email: email.to_string(),
        name: Some(email.split('@').next().unwrap_or(email).to_string()),
        org,
        iat: now,
        exp: now + 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to mint test JWT")
}
