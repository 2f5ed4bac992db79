//! Guest sign-in route.
//!
//! `GET /api/auth/guest?redirectUrl=<path>`
//!
//! Flow:
//! 1. Require the signing secret and the auth base URL → 500 if either is missing
//! 2. If the request already carries a valid session → 302 to `<origin>/`
//! 3. Reduce `redirectUrl` to a same-origin path (anything suspicious → `/`)
//! 4. Hand off to the `guest` sign-in provider and return its response
//!
//! Any failure along the way becomes a 500 with a generic message and the
//! error text in `details`.

use crate::api::handlers::{ConfigKey, GatewayState, GuestAuthError};
use crate::auth::provider::{SignInContext, SignInOptions, GUEST_PROVIDER_ID};
use crate::auth::sign_in::redirect_found;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
};
use std::borrow::Cow;
use url::Url;

/// Query parameter carrying the post-login destination.
pub const REDIRECT_PARAM: &str = "redirectUrl";

/// Authority used only to resolve relative redirect targets; never emitted.
const PLACEHOLDER_BASE: &str = "http://localhost";

/// GET /api/auth/guest — start a guest session.
pub async fn guest_sign_in(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match issue_guest_session(&state, &uri, &headers).await {
        Ok(response) => response,
        Err(err) => {
            match &err {
                GuestAuthError::ConfigMissing(key) => {
                    tracing::error!(
                        "{} is not configured (env or auth.* in config.yaml)",
                        key.env_var()
                    );
                }
                GuestAuthError::UnexpectedFailure(e) => {
                    tracing::error!("Guest authentication error: {:?}", e);
                }
            }
            err.into_response()
        }
    }
}

async fn issue_guest_session(
    state: &GatewayState,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, GuestAuthError> {
    let auth_config = &state.auth_config;
    let secret = auth_config
        .secret()
        .ok_or(GuestAuthError::ConfigMissing(ConfigKey::AuthSecret))?;
    let auth_url = auth_config
        .url()
        .ok_or(GuestAuthError::ConfigMissing(ConfigKey::AuthUrl))?;
    let secure_cookie = auth_config.secure_cookie();

    let origin = request_origin(headers, auth_url)?;

    let session = state
        .introspector
        .get_token(headers, secret, secure_cookie)
        .await?;
    if session.is_some() {
        tracing::debug!("Request already carries a valid session, redirecting home");
        return Ok(redirect_found(&format!("{}/", origin))?);
    }

    let raw_target = query_param(uri, REDIRECT_PARAM);
    let redirect_to = sanitize_redirect_target(raw_target.as_deref());

    let response = state
        .sign_in
        .sign_in(
            GUEST_PROVIDER_ID,
            SignInOptions {
                redirect: true,
                redirect_to,
            },
            SignInContext {
                secret,
                auth_url,
                origin: &origin,
                secure_cookie,
            },
        )
        .await?;

    Ok(response)
}

/// First value of query parameter `name`, form-decoded.
fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Reduce a caller-supplied redirect target to a same-origin path.
///
/// The result always starts with `/` and never carries a scheme, host,
/// query or fragment. Absent, empty, undecodable or non-relative input
/// collapses to `/`.
pub fn sanitize_redirect_target(raw: Option<&str>) -> String {
    let raw = raw.filter(|r| !r.is_empty()).unwrap_or("/");

    let Some(decoded) = decode_uri_component(raw) else {
        return "/".to_string();
    };
    if !decoded.starts_with('/') {
        return "/".to_string();
    }

    match Url::parse(PLACEHOLDER_BASE).and_then(|base| base.join(&decoded)) {
        Ok(resolved) => resolved.path().to_string(),
        Err(_) => "/".to_string(),
    }
}

/// Strict percent-decoding: every `%` must start a two-hex-digit escape and
/// the decoded bytes must be UTF-8.
fn decode_uri_component(raw: &str) -> Option<Cow<'_, str>> {
    let well_formed = raw.split('%').skip(1).all(|escape| {
        escape.len() >= 2 && escape.as_bytes()[..2].iter().all(u8::is_ascii_hexdigit)
    });
    if !well_formed {
        return None;
    }
    urlencoding::decode(raw).ok()
}

/// Origin (`scheme://host[:port]`) the browser used to reach us.
///
/// Honours `X-Forwarded-Host` / `X-Forwarded-Proto` from a fronting proxy.
/// Without any host header, falls back to the origin of `auth_url`.
pub fn request_origin(headers: &HeaderMap, auth_url: &str) -> Result<String> {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let Some(host) = header_str("x-forwarded-host").or_else(|| header_str("host")) else {
        let base = Url::parse(auth_url)
            .with_context(|| format!("Invalid auth URL: {}", auth_url))?;
        return Ok(base.origin().ascii_serialization());
    };

    let scheme = match header_str("x-forwarded-proto") {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };

    let url = Url::parse(&format!("{}://{}", scheme, host))
        .with_context(|| format!("Invalid Host header: {}", host))?;
    Ok(url.origin().ascii_serialization())
}

// ============================================================================
// Tests
// ============================================================================
