//! Trait seams between the guest route and the authentication subsystem.
//!
//! The route handler only ever talks to these two traits. The default
//! implementations live in [`crate::auth::introspect`] and
//! [`crate::auth::sign_in`]; tests swap in mocks.

use super::jwt::SessionClaims;
use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::response::Response;

/// Provider id of the anonymous guest identity strategy.
pub const GUEST_PROVIDER_ID: &str = "guest";

/// Options passed to [`SignInProvider::sign_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOptions {
    /// Answer with a redirect (`true`) or with a JSON `{ "url" }` body (`false`)
    pub redirect: bool,
    /// Same-origin path the browser should land on after sign-in
    pub redirect_to: String,
}

/// Per-request values a sign-in provider may need.
#[derive(Debug, Clone, Copy)]
pub struct SignInContext<'a> {
    pub secret: &'a str,
    pub auth_url: &'a str,
    /// Origin of the incoming request, e.g. `https://app.example.com`
    pub origin: &'a str,
    pub secure_cookie: bool,
}

/// Sign-in entry point of the authentication subsystem.
#[async_trait]
pub trait SignInProvider: Send + Sync {
    /// Start (or complete) a sign-in with `provider_id`.
    ///
    /// Errors on unknown providers or misconfiguration.
    async fn sign_in(
        &self,
        provider_id: &str,
        options: SignInOptions,
        ctx: SignInContext<'_>,
    ) -> Result<Response>;
}

/// Token-introspection primitive of the authentication subsystem.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    /// Return the session carried by the request, if any is present and valid.
    async fn get_token(
        &self,
        headers: &HeaderMap,
        secret: &str,
        secure_cookie: bool,
    ) -> Result<Option<SessionClaims>>;
}
