use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todo_core::{AppConfig, StorageBackend, config::config_path};
use todo_server::{AppState, create_router};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo-server", version, about = "Todo API server")]
struct Cli {
    /// Path to config.toml (default: $TODO_SERVER_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// Override [server].bind, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,
    },

    /// Apply database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut cfg = AppConfig::load(&config_path(cli.config))?;

    match cli.cmd.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            serve(cfg).await
        }
        Command::Migrate => migrate(cfg).await,
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.validate()?;
    let state = AppState::init(&cfg).await?;
    let app = create_router(state, &cfg.server);

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind).await?;
    tracing::info!(address = %cfg.server.bind, auth = ?cfg.auth.mode, "todo-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("todo-server stopped");
    Ok(())
}

async fn migrate(cfg: AppConfig) -> anyhow::Result<()> {
    if cfg.database.backend == StorageBackend::Memory {
        tracing::info!("memory backend configured; nothing to migrate");
        return Ok(());
    }
    let store = todo_server::state::connect_postgres(&cfg).await?;
    store.migrate().await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
