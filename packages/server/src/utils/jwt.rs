use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT claims. The payload identifies the user and nothing else; roles and
/// capabilities are resolved from the database on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: usize,  // Expiration timestamp
}

impl Claims {
    /// The user id carried in `sub`.
    pub fn user_id(&self) -> Result<i32> {
        self.sub.parse().context("token subject is not a user id")
    }
}

/// Sign a new session token for a user, valid for `auth.token_ttl_days`.
pub fn sign(user_id: i32, auth: &AuthConfig) -> Result<String> {
    sign_with_ttl(user_id, &auth.jwt_secret, Duration::days(auth.token_ttl_days))
}

/// Sign a token with an explicit lifetime. A negative `ttl` yields an already expired token.
pub fn sign_with_ttl(user_id: i32, secret: &str, ttl: Duration) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .context("token expiry out of range")?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.max(0) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature and expiry, returning the decoded claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
