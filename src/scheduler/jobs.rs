//! What each cadence sends once it is due

use super::Scheduler;
use crate::{
  channel::{self, Callback},
  insight::{alerts, report},
  prelude::*,
  sv::{self, insight::WEEKLY_CHART_CAPTION},
};

pub(super) async fn weigh_in(sc: &Scheduler, user: i64) -> Result<()> {
  sc.messenger
    .send(user, report::weigh_in_prompt(), &channel::weigh_in_actions())
    .await
}

pub(super) async fn daily_summary(
  sc: &Scheduler,
  user: i64,
  today: Date,
) -> Result<()> {
  let summary = sv::Insight::new(&sc.db).daily(user, today).await?;

  if summary.has_activity() {
    sc.messenger.send(user, &report::daily_summary(&summary), &[]).await
  } else {
    sc.messenger
      .send(user, report::daily_prompt(), &channel::logging_actions())
      .await
  }
}

pub(super) async fn weekly_report(
  sc: &Scheduler,
  user: i64,
  today: Date,
  with_coach: bool,
) -> Result<()> {
  let coach = with_coach.then_some(sc.coach.as_ref());
  let weekly = sv::Insight::new(&sc.db)
    .weekly_report(user, today, coach, sc.charts.as_deref())
    .await?;

  if let Some(png) = weekly.chart
    && let Err(err) = sc.messenger.send_image(user, png, WEEKLY_CHART_CAPTION).await
  {
    warn!(user, cadence = "weekly_report", "Chart not delivered: {err}");
  }

  sc.messenger.send(user, &weekly.text, &[]).await
}

/// Sends every alert that fires for the user. Returns `(fired, failed)`.
pub(super) async fn alerts(
  sc: &Scheduler,
  user: i64,
  today: Date,
) -> Result<(usize, usize)> {
  let ctx = sv::Insight::new(&sc.db).alert_context(user, today).await?;
  let fired = alerts::evaluate(&ctx);

  let mut failed = 0;
  for (idx, alert) in fired.iter().enumerate() {
    let actions: Vec<_> =
      alert.kind.actions().into_iter().map(Callback::action).collect();
    if let Err(err) =
      sc.messenger.send(user, &report::alert(alert), &actions).await
    {
      warn!(user, rule = alert.kind.tag(), "Alert not delivered: {err}");
      if sc.deactivate_if_blocked(user, &err).await {
        // the rest would fail the same way
        let delivered = idx - failed;
        return Ok((fired.len(), fired.len() - delivered));
      }
      failed += 1;
    }
  }
  Ok((fired.len(), failed))
}
