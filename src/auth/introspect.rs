//! Cookie-based session introspection.

use super::jwt::{decode_session, SessionClaims};
use super::provider::TokenIntrospector;
use super::session::session_token_from_headers;
use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;

/// Reads the session cookie and verifies it as an HS256 session token.
///
/// A missing cookie and a token that fails verification (bad signature,
/// expired, garbage) both mean "no session". This never errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieTokenIntrospector;

#[async_trait]
impl TokenIntrospector for CookieTokenIntrospector {
    async fn get_token(
        &self,
        headers: &HeaderMap,
        secret: &str,
        secure_cookie: bool,
    ) -> Result<Option<SessionClaims>> {
        let Some(token) = session_token_from_headers(headers, secure_cookie) else {
            return Ok(None);
        };

        match decode_session(&token, secret) {
            Ok(claims) => Ok(Some(claims)),
            Err(e) => {
                tracing::debug!("Ignoring invalid session cookie: {:#}", e);
                Ok(None)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
