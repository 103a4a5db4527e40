use crate::error::ApiError;
use std::sync::Arc;
use todo_adapter_pg::{PostgresStore, PostgresStoreOptions};
use todo_auth::{AuthService, GoogleProvider, SessionManager};
use todo_core::{
    AppConfig, AuthMode, MemoryStore, StorageBackend, TodoRepository, TodoService, UserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    todos: TodoService,
    /// `None` when auth is disabled.
    auth: Option<AuthService>,
}

impl AppState {
    pub fn new(todos: TodoService, auth: Option<AuthService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { todos, auth }),
        }
    }

    /// Build storage and services from the configuration.
    pub async fn init(cfg: &AppConfig) -> anyhow::Result<Self> {
        let (todos, users): (Arc<dyn TodoRepository>, Arc<dyn UserRepository>) =
            match cfg.database.backend {
                StorageBackend::Postgres => {
                    let store = connect_postgres(cfg).await?;
                    if cfg.database.run_migrations {
                        store.migrate().await?;
                    }
                    (Arc::new(store.clone()), Arc::new(store))
                }
                StorageBackend::Memory => {
                    tracing::warn!("using in-memory storage; data is lost on restart");
                    let store = MemoryStore::new();
                    (Arc::new(store.clone()), Arc::new(store))
                }
            };

        let auth = match cfg.auth.mode {
            AuthMode::Disabled => {
                tracing::info!("authentication disabled; todos are shared");
                None
            }
            AuthMode::Google => Some(build_auth(cfg, users)?),
        };

        Ok(Self::new(TodoService::new(todos), auth))
    }

    pub fn todos(&self) -> &TodoService {
        &self.inner.todos
    }

    pub fn auth(&self) -> Option<&AuthService> {
        self.inner.auth.as_ref()
    }

    /// The auth service, for handlers that are only mounted when it exists.
    pub fn require_auth(&self) -> Result<&AuthService, ApiError> {
        self.auth()
            .ok_or_else(|| ApiError::Internal("authentication is not configured".to_string()))
    }
}

pub async fn connect_postgres(cfg: &AppConfig) -> anyhow::Result<PostgresStore> {
    let url = cfg.database.resolve_url().ok_or_else(|| {
        anyhow::anyhow!("database URL is not set (set {} or [database].url)", cfg.database.url_env)
    })?;
    let store = PostgresStore::connect(
        &url,
        PostgresStoreOptions {
            max_connections: cfg.database.max_connections,
        },
    )
    .await?;
    tracing::info!(max_connections = cfg.database.max_connections, "connected to postgres");
    Ok(store)
}

fn build_auth(cfg: &AppConfig, users: Arc<dyn UserRepository>) -> anyhow::Result<AuthService> {
    let ttl = chrono::Duration::from_std(cfg.auth.session_ttl()?)?;
    let sessions = match cfg.auth.resolve_jwt_secret() {
        Some(secret) => SessionManager::new(secret.as_bytes(), ttl),
        None => {
            tracing::warn!(
                env = %cfg.auth.jwt_secret_env,
                "no JWT secret configured; using an ephemeral key, sessions end on restart"
            );
            SessionManager::ephemeral(ttl)
        }
    };
    let provider = GoogleProvider::new(&cfg.auth.google)?;
    Ok(AuthService::new(
        Arc::new(provider),
        users,
        sessions,
        &cfg.auth.frontend_url,
    )?)
}
