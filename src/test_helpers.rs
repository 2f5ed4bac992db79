//! Test helper factories and mock seams
//!
//! Provides a test AuthConfig, recording mocks for the sign-in and
//! introspection traits, and a builder for the shared server state.
#![allow(dead_code)]

use crate::api::handlers::{GatewayState, ServerState};
use crate::auth::jwt::SessionClaims;
use crate::auth::provider::{SignInContext, SignInOptions, SignInProvider, TokenIntrospector};
use crate::auth::sign_in::redirect_found;
use crate::{AuthConfig, SignInMode};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::response::Response;
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "test-secret-key-minimum-32-chars!!";

/// AuthConfig with both secrets present, production cookie mode.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        secret: Some(TEST_SECRET.to_string()),
        url: Some("https://auth.example.com".to_string()),
        dev_mode: false,
        session_max_age_secs: 3600,
        sign_in_mode: SignInMode::Local,
    }
}

/// Build server state around the given seams.
pub fn mock_state(
    auth_config: AuthConfig,
    introspector: Arc<dyn TokenIntrospector>,
    sign_in: Arc<dyn SignInProvider>,
) -> GatewayState {
    Arc::new(ServerState {
        auth_config: Arc::new(auth_config),
        introspector,
        sign_in,
    })
}

// ============================================================================
// Introspection mock
// ============================================================================

#[derive(Debug, Clone, Default)]
enum IntrospectOutcome {
    #[default]
    NoSession,
    Session,
    Fail(String),
}

/// Records `(secret, secure_cookie)` for every call.
#[derive(Debug, Default)]
pub struct MockIntrospector {
    outcome: IntrospectOutcome,
    calls: Mutex<Vec<(String, bool)>>,
}

impl MockIntrospector {
    pub fn with_session() -> Self {
        Self {
            outcome: IntrospectOutcome::Session,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: IntrospectOutcome::Fail(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenIntrospector for MockIntrospector {
    async fn get_token(
        &self,
        _headers: &HeaderMap,
        secret: &str,
        secure_cookie: bool,
    ) -> Result<Option<SessionClaims>> {
        self.calls
            .lock()
            .unwrap()
            .push((secret.to_string(), secure_cookie));

        match &self.outcome {
            IntrospectOutcome::NoSession => Ok(None),
            IntrospectOutcome::Session => Ok(Some(SessionClaims::guest(3600).unwrap())),
            IntrospectOutcome::Fail(msg) => Err(anyhow!("{}", msg)),
        }
    }
}

// ============================================================================
// Sign-in mock
// ============================================================================

#[derive(Debug, Clone, Default)]
enum SignInOutcome {
    #[default]
    Redirect,
    Fail(String),
    Panic(String),
}

/// Records `(provider_id, options, origin)` for every call and answers with
/// `302 https://signin.mock/<provider>?to=<redirect_to>`.
#[derive(Debug, Default)]
pub struct MockSignIn {
    outcome: SignInOutcome,
    calls: Mutex<Vec<(String, SignInOptions, String)>>,
}

impl MockSignIn {
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: SignInOutcome::Fail(message.to_string()),
            ..Default::default()
        }
    }

    pub fn panicking(message: &str) -> Self {
        Self {
            outcome: SignInOutcome::Panic(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, SignInOptions, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignInProvider for MockSignIn {
    async fn sign_in(
        &self,
        provider_id: &str,
        options: SignInOptions,
        ctx: SignInContext<'_>,
    ) -> Result<Response> {
        self.calls.lock().unwrap().push((
            provider_id.to_string(),
            options.clone(),
            ctx.origin.to_string(),
        ));

        match &self.outcome {
            SignInOutcome::Redirect => redirect_found(&format!(
                "https://signin.mock/{}?to={}",
                provider_id, options.redirect_to
            )),
            SignInOutcome::Fail(msg) => Err(anyhow!("{}", msg)),
            SignInOutcome::Panic(msg) => panic!("{}", msg),
        }
    }
}
