//! Shared server state, error mapping and the health handler

use crate::auth::provider::{SignInProvider, TokenIntrospector};
use crate::AuthConfig;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    /// Read-only auth configuration, loaded once at startup
    pub auth_config: Arc<AuthConfig>,
    pub introspector: Arc<dyn TokenIntrospector>,
    pub sign_in: Arc<dyn SignInProvider>,
}

/// Shared gateway state
pub type GatewayState = Arc<ServerState>;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Error handling
// ============================================================================

/// Generic message for every unexpected failure during sign-in.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "Internal server error during authentication";

/// Required configuration entries of the guest route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    AuthSecret,
    AuthUrl,
}

impl ConfigKey {
    /// Environment variable that supplies the entry.
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::AuthSecret => "AUTH_SECRET",
            ConfigKey::AuthUrl => "AUTH_URL",
        }
    }

    /// Client-facing message when the entry is missing.
    pub fn message(self) -> &'static str {
        match self {
            ConfigKey::AuthSecret => "Authentication not configured properly",
            ConfigKey::AuthUrl => "Authentication URL not configured",
        }
    }
}

/// Failures of the guest sign-in route. Both map to HTTP 500.
#[derive(Debug, thiserror::Error)]
pub enum GuestAuthError {
    #[error("{} is not set", .0.env_var())]
    ConfigMissing(ConfigKey),
    #[error(transparent)]
    UnexpectedFailure(#[from] anyhow::Error),
}

impl IntoResponse for GuestAuthError {
    fn into_response(self) -> Response {
        let body = match self {
            GuestAuthError::ConfigMissing(key) => serde_json::json!({
                "error": key.message()
            }),
            GuestAuthError::UnexpectedFailure(e) => {
                unexpected_failure_body(&format!("{:#}", e))
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn unexpected_failure_body(details: &str) -> serde_json::Value {
    let details = if details.is_empty() {
        "Unknown error"
    } else {
        details
    };
    serde_json::json!({
        "error": UNEXPECTED_FAILURE_MESSAGE,
        "details": details
    })
}

/// Convert a panic caught by the router into the unexpected-failure response.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        String::new()
    };

    tracing::error!("Panic while handling request: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(unexpected_failure_body(&details)),
    )
        .into_response()
}
