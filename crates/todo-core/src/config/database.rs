//! Database configuration.
//!
//! The connection URL is resolved in order of precedence:
//! 1. the environment variable named by `url_env` (default `DATABASE_URL`)
//! 2. `url` from the config file

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local store; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_url_env")]
    pub url_env: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply embedded migrations on startup.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_url_env() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_run_migrations() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: None,
            url_env: default_url_env(),
            max_connections: default_max_connections(),
            run_migrations: default_run_migrations(),
        }
    }
}

impl DatabaseConfig {
    pub fn resolve_url(&self) -> Option<String> {
        super::non_empty_env(&self.url_env).or_else(|| self.url.clone().filter(|u| !u.is_empty()))
    }
}
