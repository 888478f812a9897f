//! Fitcoach - nutrition, weight, sleep and strength tracker for Telegram
//!
//! Architecture:
//! - SeaORM for storage (SQLite)
//! - Teloxide for the chat surface and scheduled messages
//! - Axum for the health endpoint
//! - Tokio for the async runtime and the dispatch scheduler

mod channel;
mod config;
mod entity;
mod error;
mod insight;
mod plugins;
mod prelude;
mod scheduler;
mod state;
mod sv;
mod utils;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  config::Config,
  plugins::{App, cron, server, telegram},
  prelude::*,
  state::AppState,
};

/// Time given to in-flight work after Ctrl-C
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "fitcoach=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  info!("Starting Fitcoach v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config).await?);

  let supervisor = tokio::spawn(
    App::new()
      .register(telegram::Plugin)
      .register(cron::Scheduler)
      .register(server::Plugin)
      .run(app.clone()),
  );

  tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
  info!("Shutdown requested");
  app.shutdown.cancel();

  if time::timeout(SHUTDOWN_GRACE, supervisor).await.is_err() {
    warn!("Services did not stop within {SHUTDOWN_GRACE:?}");
  }
  Ok(())
}
