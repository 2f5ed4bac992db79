//! Guest Auth Gateway
//!
//! Issues anonymous guest sessions behind a single redirect route:
//! - `GET /api/auth/guest` checks config, short-circuits existing sessions,
//!   sanitizes the post-login target and hands off to a sign-in provider
//! - Pluggable sign-in and token-introspection seams (`auth::provider`)
//! - JWT session cookies for the built-in guest provider

pub mod api;
pub mod auth;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use auth::provider::{SignInProvider, TokenIntrospector};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub auth: AuthConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Which sign-in entry point handles the `guest` provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMode {
    /// Mint the guest session in-process (JWT session cookie).
    #[default]
    Local,
    /// Redirect to the hosted auth service's `/api/auth/signin/{provider}` endpoint.
    Hosted,
}

impl SignInMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "hosted" => Some(Self::Hosted),
            _ => None,
        }
    }
}

/// Authentication configuration.
///
/// Both secrets are optional at load time: a missing secret does not stop
/// the server, it makes every guest sign-in request answer with a 500
/// naming the missing key.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session signing secret (HS256)
    pub secret: Option<String>,
    /// Base URL of the auth service (e.g. "https://app.example.com")
    pub url: Option<String>,
    /// Development mode: session cookies are not marked `Secure`
    pub dev_mode: bool,
    /// Guest session lifetime in seconds (default: 30 days)
    pub session_max_age_secs: u64,
    pub sign_in_mode: SignInMode,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            url: None,
            dev_mode: false,
            session_max_age_secs: default_session_max_age(),
            sign_in_mode: SignInMode::Local,
        }
    }
}

fn default_session_max_age() -> u64 {
    2_592_000 // 30 days
}

/// Upper bound for `session_max_age_secs`: 400 days, the longest cookie
/// lifetime browsers honour.
pub const MAX_SESSION_MAX_AGE_SECS: u64 = 34_560_000;

impl AuthConfig {
    /// Signing secret, treating an empty value as unset.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    /// Base auth URL, treating an empty value as unset.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether session cookies require transport security.
    pub fn secure_cookie(&self) -> bool {
        !self.dev_mode
    }

    /// Reject session lifetimes outside `1..=MAX_SESSION_MAX_AGE_SECS`.
    pub fn validate(&self) -> Result<()> {
        if self.session_max_age_secs == 0 || self.session_max_age_secs > MAX_SESSION_MAX_AGE_SECS {
            anyhow::bail!(
                "session_max_age_secs must be between 1 and {}, got {}",
                MAX_SESSION_MAX_AGE_SECS,
                self.session_max_age_secs
            );
        }
        Ok(())
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        let mut auth = yaml.auth;

        if let Some(secret) = env_non_empty("AUTH_SECRET") {
            auth.secret = Some(secret);
        }
        if let Some(url) = env_non_empty("AUTH_URL") {
            auth.url = Some(url);
        }
        if let Some(raw) = env_non_empty("DEV_MODE") {
            auth.dev_mode = parse_flag(&raw);
        }
        if let Some(raw) = env_non_empty("SESSION_MAX_AGE_SECS") {
            auth.session_max_age_secs = raw
                .parse()
                .with_context(|| format!("SESSION_MAX_AGE_SECS is not a number: {}", raw))?;
        }
        if let Some(raw) = env_non_empty("SIGN_IN_MODE") {
            auth.sign_in_mode = SignInMode::parse(&raw).with_context(|| {
                format!("SIGN_IN_MODE must be 'local' or 'hosted', got '{}'", raw)
            })?;
        }
        auth.validate()?;

        let server_port = match env_non_empty("SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("SERVER_PORT is not a valid port: {}", raw))?,
            None => yaml.server.port,
        };

        Ok(Self {
            server_host: env_non_empty("SERVER_HOST").unwrap_or(yaml.server.host),
            server_port,
            auth,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ============================================================================
// Server bootstrap
// ============================================================================

/// Build the shared server state with the default seams for `config`.
pub fn build_state(config: &Config) -> api::handlers::GatewayState {
    let introspector: Arc<dyn TokenIntrospector> =
        Arc::new(auth::introspect::CookieTokenIntrospector);
    let sign_in: Arc<dyn SignInProvider> = match config.auth.sign_in_mode {
        SignInMode::Local => Arc::new(auth::sign_in::GuestSessionIssuer::new(
            config.auth.session_max_age_secs,
        )),
        SignInMode::Hosted => Arc::new(auth::sign_in::HostedSignIn),
    };

    Arc::new(api::handlers::ServerState {
        auth_config: Arc::new(config.auth.clone()),
        introspector,
        sign_in,
    })
}

/// Start the HTTP server and serve until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    if config.auth.secret().is_none() {
        tracing::warn!("AUTH_SECRET is not set; guest sign-in will answer 500");
    }
    if config.auth.url().is_none() {
        tracing::warn!("AUTH_URL is not set; guest sign-in will answer 500");
    }

    let state = build_state(&config);
    let app = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server_host, config.server_port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        "Guest auth gateway listening on {} (sign-in mode: {:?}, dev_mode: {})",
        addr,
        config.auth.sign_in_mode,
        config.auth.dev_mode
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ============================================================================
// Tests
// ============================================================================
