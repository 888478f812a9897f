pub mod cron;
pub mod server;
pub mod telegram;

use futures::future;
use tokio::task::JoinHandle;

use crate::{prelude::*, state::AppState};

#[async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Restart delay after a plugin stops or crashes
const RESTART_DELAY: Duration = Duration::from_secs(5);

pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  /// Supervises every plugin until `app.shutdown` is cancelled.
  pub async fn run(self, app: Arc<AppState>) {
    let handles: Vec<JoinHandle<()>> = self
      .plugins
      .into_iter()
      .map(|plugin| tokio::spawn(supervise(plugin, app.clone())))
      .collect();

    future::join_all(handles).await;
  }
}

async fn supervise(plugin: Arc<dyn Plugin>, app: Arc<AppState>) {
  let name = plugin.name();
  info!("SYSTEM: Service `{name}` initialized");

  loop {
    let handle = tokio::spawn({
      let app = app.clone();
      let plugin = plugin.clone();
      async move { plugin.start(app).await }
    });

    match handle.await {
      Ok(Ok(())) if app.shutdown.is_cancelled() => {
        info!("Service `{name}` shutdown.");
        break;
      }
      Ok(Ok(())) => {
        warn!("Service `{name}` stopped unexpectedly (Ok).");
      }
      Ok(Err(err)) => {
        error!("Service `{name}` crashed with error: {err:#}.");
      }
      Err(join_err) if join_err.is_cancelled() => {
        info!("Service `{name}` shutdown.");
        break;
      }
      Err(_) => {
        error!("Service `{name}` PANICKED!");
      }
    }

    tokio::select! {
      _ = app.shutdown.cancelled() => break,
      _ = time::sleep(RESTART_DELAY) => {}
    }
    info!("SYSTEM: Restarting service `{name}`...");
  }
}
