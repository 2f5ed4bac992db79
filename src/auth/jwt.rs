//! Session token encoding and decoding using HS256.
//!
//! The session token is the value of the session cookie. It carries the
//! identity of the signed-in user (guest or regular) and is verified with
//! the configured auth secret.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of identity behind a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Guest,
    Regular,
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — user UUID
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for a freshly created anonymous guest.
    ///
    /// Guests get a random UUID and a `guest-<unix millis>` pseudo email so
    /// that two guests created in the same second still differ.
    ///
    /// Fails if `iat + expiry_secs` does not fit in an `i64` timestamp.
    pub fn guest(expiry_secs: u64) -> Result<Self> {
        let now = chrono::Utc::now();
        let iat = now.timestamp();
        let exp = i64::try_from(expiry_secs)
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .with_context(|| format!("Session lifetime out of range: {}s", expiry_secs))?;

        Ok(Self {
            sub: Uuid::new_v4().to_string(),
            email: format!("guest-{}", now.timestamp_millis()),
            name: "Guest".to_string(),
            user_type: UserType::Guest,
            iat,
            exp,
        })
    }

    pub fn is_guest(&self) -> bool {
        self.user_type == UserType::Guest
    }
}

/// Sign `claims` into a session token.
pub fn encode_session(claims: &SessionClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode session token")
}

/// Decode and validate a session token.
///
/// Returns the claims if the token is valid, not expired, and
/// signed with the correct secret.
pub fn decode_session(token: &str, secret: &str) -> Result<SessionClaims> {
    let token_data: TokenData<SessionClaims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode session token")?;

    Ok(token_data.claims)
}

// ============================================================================
// Tests
// ============================================================================
