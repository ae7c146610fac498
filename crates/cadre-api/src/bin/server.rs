//! cadre server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use cadre_api::ServerConfig;
use cadre_core::validate::ValidationConfig;
use cadre_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cadre organizational-chart server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CADRE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Validation bounds for the versioning engine.
  let mut validation = ValidationConfig::default();
  if let Some(max) = server_cfg.max_percentage {
    validation.max_percentage = max;
  }
  if let Some(threshold) = server_cfg.overload_threshold {
    validation.overload_threshold = threshold;
  }

  // Open SQLite store.
  let store =
    SqliteStore::open_with_config(&server_cfg.store_path, validation)
      .await
      .with_context(|| {
        format!("failed to open store at {:?}", server_cfg.store_path)
      })?;

  let app = axum::Router::new()
    .nest("/api", cadre_api::api_router(Arc::new(store)))
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
