//! JWT token generation and validation

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id, stringified
    pub sub: String,
    /// Is admin
    pub is_admin: bool,
    /// Expiration timestamp
    pub exp: u64,
}

/// User information extracted from a verified token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
    pub is_admin: bool,
}

/// Generate a JWT token for a user
pub fn generate_token(
    user_id: i64,
    is_admin: bool,
    secret: &str,
    lifetime_seconds: u64,
) -> anyhow::Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        is_admin,
        exp: now + lifetime_seconds,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate and decode a JWT token
pub fn validate_token(token: &str, secret: &str) -> anyhow::Result<AuthUser> {
    let validation = Validation::default();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let user_id = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| anyhow::anyhow!("non-numeric token subject"))?;

    Ok(AuthUser {
        user_id,
        is_admin: token_data.claims.is_admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_minimum_32_characters_long";

    #[test]
    fn test_roundtrip() {
        let token = generate_token(42, true, SECRET, 3600).unwrap();
        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.user_id, 42);
        assert!(user.is_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_token(42, false, SECRET, 3600).unwrap();
        assert!(validate_token(&token, "another_secret_key_32_characters!!").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_token("not-a-token", SECRET).is_err());
    }
}
