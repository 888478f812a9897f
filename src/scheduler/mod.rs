//! Recurring dispatch of reminders, reports and alerts
//!
//! Two independent loops share one [`Scheduler`]: the reminder job wakes on
//! every `tick_interval` boundary and matches each active user's cadences, the
//! alert job wakes once a day at `alert_hour`. A tick fans out over users with
//! bounded concurrency; one user's failure is logged and counted, never fatal.

pub mod cadence;
mod jobs;

use chrono::DateTime as UtcDateTime;
use futures::{StreamExt, stream};
use serde::Serialize;
use teloxide::{ApiError, RequestError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use cadence::Cadence;

use crate::{
  channel::{ChartRenderer, Clock, Coach, Messenger},
  config::SchedulerConfig,
  entity::{settings, user},
  prelude::*,
  sv,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
  Reminders,
  Alerts,
}

impl Job {
  pub fn name(self) -> &'static str {
    match self {
      Job::Reminders => "reminders",
      Job::Alerts => "alerts",
    }
  }
}

/// Outcome counters of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
  /// Active users looked at
  pub users: usize,
  /// Messages that were due
  pub due: usize,
  pub sent: usize,
  pub failed: usize,
}

impl TickReport {
  fn absorb(&mut self, other: TickReport) {
    self.due += other.due;
    self.sent += other.sent;
    self.failed += other.failed;
  }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickRecord {
  pub at: UtcDateTime<Utc>,
  #[serde(flatten)]
  pub report: TickReport,
}

/// Last completed tick per job, read by the health endpoint
pub type Ticks = Arc<DashMap<&'static str, TickRecord>>;

pub struct Scheduler {
  db: DatabaseConnection,
  messenger: Arc<dyn Messenger>,
  coach: Arc<dyn Coach>,
  charts: Option<Arc<dyn ChartRenderer>>,
  clock: Arc<dyn Clock>,
  config: SchedulerConfig,
  ticks: Ticks,
}

/// Running scheduler loops
pub struct SchedulerHandle {
  cancel: CancellationToken,
  tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
  /// Stops both loops. A tick in flight runs to completion first.
  pub async fn stop(self) {
    self.cancel.cancel();
    for result in futures::future::join_all(self.tasks).await {
      if let Err(err) = result {
        error!("Scheduler loop panicked: {err}");
      }
    }
  }
}

impl Scheduler {
  pub fn new(
    db: DatabaseConnection,
    messenger: Arc<dyn Messenger>,
    coach: Arc<dyn Coach>,
    charts: Option<Arc<dyn ChartRenderer>>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
  ) -> Self {
    Self {
      db,
      messenger,
      coach,
      charts,
      clock,
      config,
      ticks: Arc::new(DashMap::new()),
    }
  }

  /// Shares the tick records with an outside reader.
  pub fn with_ticks(mut self, ticks: Ticks) -> Self {
    self.ticks = ticks;
    self
  }

  /// Spawns both loops and hands back their handle.
  pub fn start(self: Arc<Self>) -> SchedulerHandle {
    let cancel = CancellationToken::new();
    let tasks = [Job::Reminders, Job::Alerts]
      .into_iter()
      .map(|job| {
        let this = self.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { this.run_job(job, cancel).await })
      })
      .collect();
    SchedulerHandle { cancel, tasks }
  }

  fn next_tick(&self, job: Job) -> UtcDateTime<Utc> {
    let now = self.clock.now();
    match job {
      Job::Reminders => cadence::next_boundary(now, self.config.tick_interval),
      Job::Alerts => cadence::next_daily(
        now,
        self.config.alert_hour,
        self.config.default_timezone,
      ),
    }
  }

  async fn run_job(&self, job: Job, cancel: CancellationToken) {
    info!(job = job.name(), "Scheduler job started");

    loop {
      // computed after the previous tick, so an overrun skips boundaries
      let next = self.next_tick(job);
      let wait = (next - self.clock.now()).to_std().unwrap_or_default();
      debug!(job = job.name(), %next, "Waiting for the next tick");

      tokio::select! {
        _ = cancel.cancelled() => break,
        _ = time::sleep(wait) => {}
      }

      let result = match job {
        Job::Reminders => self.reminder_tick().await,
        Job::Alerts => self.alert_tick().await,
      };
      match result {
        Ok(report) => info!(
          job = job.name(),
          users = report.users,
          due = report.due,
          sent = report.sent,
          failed = report.failed,
          "Tick finished"
        ),
        Err(err) => error!(job = job.name(), "Tick failed: {err}"),
      }
    }

    info!(job = job.name(), "Scheduler job stopped");
  }

  fn record(&self, job: Job, report: TickReport) {
    self
      .ticks
      .insert(job.name(), TickRecord { at: self.clock.now(), report });
  }

  /// Matches every active user's cadences against now and sends what is due.
  pub async fn reminder_tick(&self) -> Result<TickReport> {
    let now = self.clock.now();
    let pairs = sv::User::new(&self.db).active_with_settings().await?;

    let mut report = TickReport { users: pairs.len(), ..TickReport::default() };
    let mut outcomes = stream::iter(pairs)
      .map(|(user, settings)| self.remind(now, user, settings))
      .buffer_unordered(self.config.concurrency.max(1));
    while let Some(outcome) = outcomes.next().await {
      report.absorb(outcome);
    }

    self.record(Job::Reminders, report);
    Ok(report)
  }

  async fn remind(
    &self,
    now: UtcDateTime<Utc>,
    user: user::Model,
    settings: settings::Model,
  ) -> TickReport {
    let id = user.tg_user_id;
    let local =
      cadence::local_now(now, &settings, self.config.default_timezone);
    let due = cadence::due(&settings, local, self.config.tolerance_minutes);

    let mut report = TickReport { due: due.len(), ..TickReport::default() };
    for cadence in due {
      let work = async {
        match cadence {
          Cadence::WeighIn => jobs::weigh_in(self, id).await,
          Cadence::DailySummary => {
            jobs::daily_summary(self, id, local.date()).await
          }
          Cadence::WeeklyReport => {
            jobs::weekly_report(self, id, local.date(), settings.use_ai_coach)
              .await
          }
        }
      };

      match bounded(self.config.send_timeout, work).await {
        Ok(()) => report.sent += 1,
        Err(err) => {
          report.failed += 1;
          warn!(user = id, cadence = cadence.tag(), "Dispatch failed: {err}");
          self.deactivate_if_blocked(id, &err).await;
        }
      }
    }
    report
  }

  /// Evaluates the alert rules for every active user.
  pub async fn alert_tick(&self) -> Result<TickReport> {
    let now = self.clock.now();
    let pairs = sv::User::new(&self.db).active_with_settings().await?;

    let mut report = TickReport { users: pairs.len(), ..TickReport::default() };
    let mut outcomes = stream::iter(pairs)
      .map(|(user, settings)| self.alert(now, user, settings))
      .buffer_unordered(self.config.concurrency.max(1));
    while let Some(outcome) = outcomes.next().await {
      report.absorb(outcome);
    }

    self.record(Job::Alerts, report);
    Ok(report)
  }

  async fn alert(
    &self,
    now: UtcDateTime<Utc>,
    user: user::Model,
    settings: settings::Model,
  ) -> TickReport {
    let id = user.tg_user_id;
    let today =
      cadence::local_now(now, &settings, self.config.default_timezone).date();

    let work = jobs::alerts(self, id, today);
    match bounded(self.config.send_timeout, work).await {
      Ok((fired, failed)) => TickReport {
        users: 0,
        due: fired,
        sent: fired - failed,
        failed,
      },
      Err(err) => {
        warn!(user = id, cadence = "alerts", "Alert evaluation failed: {err}");
        TickReport { failed: 1, ..TickReport::default() }
      }
    }
  }

  /// Users that blocked the bot stop receiving anything until they `/start`
  /// again. Returns whether `err` was such a block.
  async fn deactivate_if_blocked(&self, user: i64, err: &Error) -> bool {
    if !matches!(err, Error::Telegram(RequestError::Api(ApiError::BotBlocked)))
    {
      return false;
    }
    match sv::User::new(&self.db).set_active(user, false).await {
      Ok(()) => info!(user, "Bot blocked by user, deactivated"),
      Err(err) => error!(user, "Failed to deactivate user: {err}"),
    }
    true
  }
}

/// Runs one user's work item under `limit`, a lapse is [`Error::Timeout`].
async fn bounded<T>(
  limit: Duration,
  work: impl Future<Output = Result<T>>,
) -> Result<T> {
  time::timeout(limit, work).await?
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    channel::testing::{
      FakeCharts, FixedClock, RecordingMessenger, Sent, StaticCoach,
    },
    insight::report,
    sv::{DailyPatch, SettingsPatch, testing::setup_db},
  };

  struct Harness {
    db: DatabaseConnection,
    messenger: Arc<RecordingMessenger>,
  }

  impl Harness {
    async fn new(messenger: RecordingMessenger) -> Self {
      Self { db: setup_db().await, messenger: Arc::new(messenger) }
    }

    async fn user(&self, id: i64, patches: &[(&str, &str)]) {
      sv::User::new(&self.db).get_or_create(id, None).await.unwrap();
      let settings = sv::Settings::new(&self.db);
      settings
        .update(id, SettingsPatch::parse("timezone", "UTC").unwrap())
        .await
        .unwrap();
      for (key, value) in patches {
        let patch = SettingsPatch::parse(key, value).unwrap();
        settings.update(id, patch).await.unwrap();
      }
    }

    fn scheduler(&self, at: &str) -> Scheduler {
      self.scheduler_with(at, Arc::new(StaticCoach(None)), None)
    }

    fn scheduler_with(
      &self,
      at: &str,
      coach: Arc<dyn Coach>,
      charts: Option<Arc<dyn ChartRenderer>>,
    ) -> Scheduler {
      Scheduler::new(
        self.db.clone(),
        self.messenger.clone(),
        coach,
        charts,
        Arc::new(FixedClock::at(at)),
        SchedulerConfig::default(),
      )
    }
  }

  // 2026-03-08 is a Sunday, the default weigh day at 10:00

  #[tokio::test]
  async fn test_weigh_in_sent_once_per_tick() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[]).await;
    let scheduler = h.scheduler("2026-03-08 10:00");

    let report = scheduler.reminder_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 1, due: 1, sent: 1, failed: 0 });
    assert_eq!(h.messenger.texts_for(1), [report::weigh_in_prompt()]);
    let Sent::Text { actions, .. } = &h.messenger.sent()[0] else {
      panic!("expected a text message");
    };
    assert_eq!(actions[0].data, "log_weight");

    // no sent-marker, the same tick delivers again
    scheduler.reminder_tick().await.unwrap();
    assert_eq!(h.messenger.texts_for(1).len(), 2);

    let record = *scheduler.ticks.get("reminders").unwrap();
    assert_eq!(record.report.sent, 1);
  }

  #[tokio::test]
  async fn test_nothing_due_off_schedule() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[]).await;

    // right time, wrong weekday
    let report = h.scheduler("2026-03-09 10:00").reminder_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 1, ..TickReport::default() });

    // outside the tolerance
    let report = h.scheduler("2026-03-08 10:30").reminder_tick().await.unwrap();
    assert_eq!(report.due, 0);
    assert!(h.messenger.sent().is_empty());
  }

  #[tokio::test]
  async fn test_matches_in_user_timezone() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[("timezone", "Asia/Tokyo")]).await;
    h.user(2, &[]).await;

    // 10:00 in Tokyo, 01:00 in UTC
    let report = h.scheduler("2026-03-08 01:00").reminder_tick().await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(h.messenger.texts_for(1).len(), 1);
    assert!(h.messenger.texts_for(2).is_empty());
  }

  #[tokio::test]
  async fn test_unknown_timezone_uses_default() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[]).await;
    let stored = sv::Settings::new(&h.db).get(1).await.unwrap();
    settings::ActiveModel {
      timezone: Set("Mars/Base".into()),
      ..stored.into()
    }
    .update(&h.db)
    .await
    .unwrap();

    // 10:00 in Yerevan
    let report = h.scheduler("2026-03-08 06:00").reminder_tick().await.unwrap();
    assert_eq!(report.sent, 1);
  }

  #[tokio::test]
  async fn test_failing_user_does_not_block_others() {
    let h = Harness::new(RecordingMessenger::failing_for(&[2])).await;
    for id in 1..=3 {
      h.user(id, &[]).await;
    }

    let report = h.scheduler("2026-03-08 10:00").reminder_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 3, due: 3, sent: 2, failed: 1 });
    assert_eq!(h.messenger.texts_for(1).len(), 1);
    assert_eq!(h.messenger.texts_for(3).len(), 1);
  }

  #[tokio::test]
  async fn test_blocked_user_is_deactivated() {
    let h = Harness::new(RecordingMessenger {
      blocked: vec![1],
      ..RecordingMessenger::default()
    })
    .await;
    h.user(1, &[]).await;
    h.user(2, &[]).await;

    let report = h.scheduler("2026-03-08 10:00").reminder_tick().await.unwrap();
    assert_eq!(report.failed, 1);
    let user = user::Entity::find_by_id(1).one(&h.db).await.unwrap();
    assert!(!user.unwrap().is_active);

    let report = h.scheduler("2026-03-08 10:00").reminder_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 1, due: 1, sent: 1, failed: 0 });
  }

  #[tokio::test]
  async fn test_slow_send_times_out() {
    let h = Harness::new(RecordingMessenger {
      delay: Some(Duration::from_millis(500)),
      ..RecordingMessenger::default()
    })
    .await;
    h.user(1, &[]).await;

    let mut scheduler = h.scheduler("2026-03-08 10:00");
    scheduler.config.send_timeout = Duration::from_millis(20);
    let report = scheduler.reminder_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 1, due: 1, sent: 0, failed: 1 });
  }

  #[tokio::test]
  async fn test_daily_summary_or_prompt() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[]).await;
    h.user(2, &[]).await;
    let today = Date::from_ymd_opt(2026, 3, 9).unwrap();
    sv::Daily::new(&h.db).add_intake(1, today, 1800, None).await.unwrap();

    let report = h.scheduler("2026-03-09 21:30").reminder_tick().await.unwrap();
    assert_eq!(report.sent, 2);

    let summary = &h.messenger.texts_for(1)[0];
    assert!(summary.contains("Eaten: 1800 kcal"), "{summary}");
    assert_eq!(h.messenger.texts_for(2), [report::daily_prompt()]);
  }

  async fn weekly_user(h: &Harness) {
    h.user(1, &[]).await;
    let daily = sv::Daily::new(&h.db);
    for (day, kg) in [(3, dec!(80.4)), (6, dec!(80.0)), (8, dec!(79.7))] {
      let date = Date::from_ymd_opt(2026, 3, day).unwrap();
      let patch = DailyPatch { weight_kg: Some(kg), ..DailyPatch::default() };
      daily.upsert(1, date, patch).await.unwrap();
    }
  }

  #[tokio::test]
  async fn test_weekly_report_with_coach_and_chart() {
    let h = Harness::new(RecordingMessenger::default()).await;
    weekly_user(&h).await;

    let scheduler = h.scheduler_with(
      "2026-03-08 19:00",
      Arc::new(StaticCoach(Some("Steady progress".into()))),
      Some(Arc::new(FakeCharts { fail: false })),
    );
    let report = scheduler.reminder_tick().await.unwrap();
    assert_eq!(report.sent, 1);

    let sent = h.messenger.sent();
    assert!(matches!(sent[0], Sent::Image { chat_id: 1, .. }));
    assert!(sent[1].text().contains("Weekly report"));
    assert!(sent[1].text().contains("Steady progress"));
  }

  #[tokio::test]
  async fn test_weekly_report_survives_coach_and_chart_failures() {
    let h = Harness::new(RecordingMessenger {
      failing_images: true,
      ..RecordingMessenger::default()
    })
    .await;
    weekly_user(&h).await;

    let scheduler = h.scheduler_with(
      "2026-03-08 19:00",
      Arc::new(StaticCoach(None)),
      Some(Arc::new(FakeCharts { fail: false })),
    );
    assert_eq!(scheduler.reminder_tick().await.unwrap().sent, 1);

    let scheduler = h.scheduler_with(
      "2026-03-08 19:00",
      Arc::new(StaticCoach(None)),
      Some(Arc::new(FakeCharts { fail: true })),
    );
    assert_eq!(scheduler.reminder_tick().await.unwrap().sent, 1);

    let texts = h.messenger.texts_for(1);
    assert_eq!(texts.len(), 2);
    assert!(texts.iter().all(|text| !text.contains("Coach says")));
  }

  #[tokio::test]
  async fn test_coach_toggle_off_skips_comment() {
    let h = Harness::new(RecordingMessenger::default()).await;
    weekly_user(&h).await;
    sv::Settings::new(&h.db)
      .update(1, SettingsPatch::parse("coach", "off").unwrap())
      .await
      .unwrap();

    let scheduler = h.scheduler_with(
      "2026-03-08 19:00",
      Arc::new(StaticCoach(Some("Steady progress".into()))),
      None,
    );
    scheduler.reminder_tick().await.unwrap();
    assert!(!h.messenger.texts_for(1)[0].contains("Steady progress"));
  }

  #[tokio::test]
  async fn test_alert_tick() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[]).await;
    h.user(2, &[]).await;
    let daily = sv::Daily::new(&h.db);
    for (day, kg) in [(1, dec!(81.2)), (8, dec!(80.0))] {
      let date = Date::from_ymd_opt(2026, 3, day).unwrap();
      let patch = DailyPatch { weight_kg: Some(kg), ..DailyPatch::default() };
      daily.upsert(1, date, patch).await.unwrap();
    }

    let scheduler = h.scheduler("2026-03-08 08:00");
    let report = scheduler.alert_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 2, due: 1, sent: 1, failed: 0 });

    let sent = h.messenger.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text().contains("Rapid weight loss"));
    let Sent::Text { actions, .. } = &sent[0] else {
      panic!("expected a text message");
    };
    let data: Vec<_> = actions.iter().map(|a| a.data.as_str()).collect();
    assert_eq!(data, ["alert_adjust", "alert_ack"]);
    assert!(scheduler.ticks.contains_key("alerts"));
  }

  #[tokio::test]
  async fn test_alerts_delivered_before_block_count_as_sent() {
    let h = Harness::new(RecordingMessenger {
      blocked_after: Some(1),
      ..RecordingMessenger::default()
    })
    .await;
    h.user(1, &[]).await;
    let daily = sv::Daily::new(&h.db);
    for (day, kg) in [(1, dec!(81.2)), (8, dec!(80.0))] {
      let date = Date::from_ymd_opt(2026, 3, day).unwrap();
      let patch = DailyPatch { weight_kg: Some(kg), ..DailyPatch::default() };
      daily.upsert(1, date, patch).await.unwrap();
    }
    let workout = sv::NewWorkout {
      kind: "gym".into(),
      duration_min: None,
      calories_burned: None,
      note: None,
    };
    let trained = Date::from_ymd_opt(2026, 3, 1).unwrap();
    sv::Workout::new(&h.db).add(1, trained, workout).await.unwrap();

    let report = h.scheduler("2026-03-08 08:00").alert_tick().await.unwrap();
    assert_eq!(report, TickReport { users: 1, due: 2, sent: 1, failed: 1 });
    assert!(h.messenger.texts_for(1)[0].contains("Rapid weight loss"));
    let user = user::Entity::find_by_id(1).one(&h.db).await.unwrap();
    assert!(!user.unwrap().is_active);
  }

  #[tokio::test]
  async fn test_weekly_report_without_trend_skips_chart() {
    let h = Harness::new(RecordingMessenger::default()).await;
    h.user(1, &[]).await;
    let date = Date::from_ymd_opt(2026, 3, 8).unwrap();
    let patch =
      DailyPatch { weight_kg: Some(dec!(80)), ..DailyPatch::default() };
    sv::Daily::new(&h.db).upsert(1, date, patch).await.unwrap();

    let scheduler = h.scheduler_with(
      "2026-03-08 19:00",
      Arc::new(StaticCoach(None)),
      Some(Arc::new(FakeCharts { fail: false })),
    );
    assert_eq!(scheduler.reminder_tick().await.unwrap().sent, 1);

    let sent = h.messenger.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(sent[0], Sent::Text { chat_id: 1, .. }));
    assert!(sent[0].text().contains("Weekly report"));
  }

  #[tokio::test]
  async fn test_handle_stops_loops() {
    let h = Harness::new(RecordingMessenger::default()).await;
    let scheduler = Arc::new(h.scheduler("2026-03-08 10:07"));

    let handle = scheduler.clone().start();
    time::timeout(Duration::from_secs(5), handle.stop()).await.unwrap();
    assert!(scheduler.ticks.is_empty());
  }
}
