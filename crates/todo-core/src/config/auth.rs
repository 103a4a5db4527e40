//! Authentication configuration.
//!
//! Secrets are looked up in the environment first (`jwt_secret_env`,
//! `client_secret_env`) and fall back to the inline values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// No login; todos are global.
    #[default]
    Disabled,
    /// Google OAuth login; todos are owned by users.
    Google,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Session token lifetime, humantime syntax ("24h", "30m").
    #[serde(default = "default_session_ttl")]
    pub session_ttl: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Where the browser is sent after login, with `?token=` appended.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    #[serde(default)]
    pub google: GoogleConfig,
}

fn default_session_ttl() -> String {
    "24h".to_string()
}

fn default_jwt_secret_env() -> String {
    "TODO_JWT_SECRET".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            session_ttl: default_session_ttl(),
            jwt_secret: None,
            jwt_secret_env: default_jwt_secret_env(),
            frontend_url: default_frontend_url(),
            google: GoogleConfig::default(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> anyhow::Result<Duration> {
        humantime::parse_duration(&self.session_ttl)
            .map_err(|e| anyhow::anyhow!("invalid auth.session_ttl '{}': {e}", self.session_ttl))
    }

    /// Signing secret, or `None` when neither env nor file provide one.
    pub fn resolve_jwt_secret(&self) -> Option<String> {
        super::non_empty_env(&self.jwt_secret_env)
            .or_else(|| self.jwt_secret.clone().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    /// Must match the callback route as registered with Google.
    #[serde(default)]
    pub redirect_uri: String,

    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,

    /// Timeout for calls to the provider, humantime syntax.
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_client_secret_env() -> String {
    "GOOGLE_CLIENT_SECRET".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            client_secret_env: default_client_secret_env(),
            redirect_uri: String::new(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            userinfo_url: default_userinfo_url(),
            timeout: default_timeout(),
        }
    }
}

impl GoogleConfig {
    pub fn resolve_client_secret(&self) -> Option<String> {
        super::non_empty_env(&self.client_secret_env)
            .or_else(|| self.client_secret.clone().filter(|s| !s.is_empty()))
    }

    pub fn timeout(&self) -> anyhow::Result<Duration> {
        humantime::parse_duration(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid auth.google.timeout '{}': {e}", self.timeout))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client_id.trim().is_empty() {
            anyhow::bail!("auth.google.client_id is required in google mode");
        }
        if self.resolve_client_secret().is_none() {
            anyhow::bail!(
                "google client secret is not set (set {} or [auth.google].client_secret)",
                self.client_secret_env
            );
        }
        if self.redirect_uri.trim().is_empty() {
            anyhow::bail!("auth.google.redirect_uri is required in google mode");
        }
        self.timeout()?;
        Ok(())
    }
}
