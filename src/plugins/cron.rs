use crate::{plugins::Plugin, prelude::*, state::AppState};

/// Reminder and alert loops, see [`crate::scheduler`]
pub struct Scheduler;

#[async_trait]
impl Plugin for Scheduler {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let handle = Arc::new(app.scheduler()).start();
    app.shutdown.cancelled().await;
    handle.stop().await;
    Ok(())
  }
}
