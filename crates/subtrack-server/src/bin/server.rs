//! subtrack server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the subscription API over HTTP.
//!
//! # Schema management
//!
//! ```text
//! server migrate up       # apply the schema (also done on every start)
//! server migrate down     # drop the subscriptions table
//! server migrate version  # print the schema version
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use subtrack_server::ServerConfig;
use subtrack_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "subtrack subscription server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Manage the database schema.
  Migrate {
    #[command(subcommand)]
    action: Migrate,
  },
}

#[derive(Subcommand)]
enum Migrate {
  Up,
  Down,
  Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SUBTRACK").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(server_cfg, &store_path).await,
    Command::Migrate { action } => migrate(action, &store_path).await,
  }
}

async fn serve(server_cfg: ServerConfig, store_path: &Path) -> anyhow::Result<()> {
  let store = SqliteStore::open(store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = subtrack_server::router(Arc::new(store), &server_cfg);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(subtrack_server::shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn migrate(action: Migrate, store_path: &Path) -> anyhow::Result<()> {
  let store = SqliteStore::connect(store_path)
    .await
    .with_context(|| format!("failed to open database at {store_path:?}"))?;

  match action {
    Migrate::Up => {
      store.migrate_up().await.context("failed to apply schema")?;
      tracing::info!("schema applied");
    }
    Migrate::Down => {
      store.migrate_down().await.context("failed to drop schema")?;
      tracing::info!("schema dropped");
    }
    Migrate::Version => {
      let version = store
        .schema_version()
        .await
        .context("failed to read schema version")?;
      println!("{version}");
    }
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
