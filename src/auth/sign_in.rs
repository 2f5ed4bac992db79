//! Sign-in entry points for the `guest` provider.
//!
//! - [`GuestSessionIssuer`] mints the guest session in-process and sets the
//!   session cookie on the redirect.
//! - [`HostedSignIn`] hands the browser to the hosted auth service's
//!   `/api/auth/signin/{provider}` endpoint with a `callbackUrl`.

use super::jwt::{encode_session, SessionClaims};
use super::provider::{SignInContext, SignInOptions, SignInProvider, GUEST_PROVIDER_ID};
use super::session::build_session_cookie;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Build a `302 Found` response pointing at `location`.
pub fn redirect_found(location: &str) -> Result<Response> {
    let value = HeaderValue::from_str(location)
        .with_context(|| format!("Invalid redirect location: {}", location))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}

/// Redirect to `destination`, or describe it as `{ "url": ... }` when the
/// caller asked for no redirect.
fn redirect_or_url(destination: &str, redirect: bool) -> Result<Response> {
    if redirect {
        redirect_found(destination)
    } else {
        Ok(Json(serde_json::json!({ "url": destination })).into_response())
    }
}

/// Creates an anonymous guest identity and signs it into a session cookie.
#[derive(Debug, Clone)]
pub struct GuestSessionIssuer {
    session_max_age_secs: u64,
}

impl GuestSessionIssuer {
    pub fn new(session_max_age_secs: u64) -> Self {
        Self {
            session_max_age_secs,
        }
    }
}

#[async_trait]
impl SignInProvider for GuestSessionIssuer {
    async fn sign_in(
        &self,
        provider_id: &str,
        options: SignInOptions,
        ctx: SignInContext<'_>,
    ) -> Result<Response> {
        if provider_id != GUEST_PROVIDER_ID {
            bail!("Unsupported sign-in provider: {}", provider_id);
        }

        let claims = SessionClaims::guest(self.session_max_age_secs)?;
        let token = encode_session(&claims, ctx.secret)?;
        let cookie = build_session_cookie(&token, self.session_max_age_secs, ctx.secure_cookie)?;

        tracing::info!(user_id = %claims.sub, "Issued guest session");

        let destination = format!("{}{}", ctx.origin, options.redirect_to);
        let mut response = redirect_or_url(&destination, options.redirect)?;
        response.headers_mut().append(header::SET_COOKIE, cookie);
        Ok(response)
    }
}

/// Delegates sign-in to the hosted auth service.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostedSignIn;

impl HostedSignIn {
    /// `<auth_url>/api/auth/signin/<provider>?callbackUrl=<origin + redirect_to>`
    pub fn sign_in_url(provider_id: &str, redirect_to: &str, ctx: &SignInContext<'_>) -> String {
        let callback_url = format!("{}{}", ctx.origin, redirect_to);
        format!(
            "{}/api/auth/signin/{}?callbackUrl={}",
            ctx.auth_url.trim_end_matches('/'),
            urlencoding::encode(provider_id),
            urlencoding::encode(&callback_url)
        )
    }
}

#[async_trait]
impl SignInProvider for HostedSignIn {
    async fn sign_in(
        &self,
        provider_id: &str,
        options: SignInOptions,
        ctx: SignInContext<'_>,
    ) -> Result<Response> {
        if provider_id.is_empty() {
            bail!("Sign-in provider id is empty");
        }
        let url = Self::sign_in_url(provider_id, &options.redirect_to, &ctx);
        tracing::debug!("Delegating {} sign-in to {}", provider_id, url);
        redirect_or_url(&url, options.redirect)
    }
}

// ============================================================================
// Tests
// ============================================================================
