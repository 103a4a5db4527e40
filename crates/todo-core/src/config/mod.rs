//! Configuration for the todo server.
//!
//! Loaded from a TOML file (default `config.toml`, overridable with
//! `TODO_SERVER_CONFIG` or `--config`). Every section has defaults, so a
//! missing file runs the server with in-process defaults:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//!
//! [database]
//! backend = "postgres"
//! url_env = "DATABASE_URL"
//!
//! [auth]
//! mode = "google"
//! session_ttl = "24h"
//!
//! [auth.google]
//! client_id = "..."
//! redirect_uri = "http://localhost:8000/api/auth/google/callback"
//! ```

pub mod auth;
pub mod database;

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub use auth::{AuthConfig, AuthMode, GoogleConfig};
pub use database::{DatabaseConfig, StorageBackend};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TODO_SERVER_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8000"
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allowed CORS origins. `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl AppConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw).map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))
    }

    /// Check cross-field requirements that serde defaults can't express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.backend == StorageBackend::Postgres && self.database.resolve_url().is_none() {
            anyhow::bail!(
                "database URL is not set (set {} or [database].url)",
                self.database.url_env
            );
        }
        self.auth.session_ttl()?;
        if self.auth.mode == AuthMode::Google {
            self.auth.google.validate()?;
        }
        Ok(())
    }
}

/// Resolve the config path: explicit argument, then `TODO_SERVER_CONFIG`,
/// then `config.toml` in the working directory.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(p) = explicit {
        return p;
    }
    if let Ok(p) = env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from("config.toml")
}

/// Read a non-empty environment variable.
pub(crate) fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
