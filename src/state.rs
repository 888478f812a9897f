use teloxide::Bot;
use tokio_util::sync::CancellationToken;

use crate::{
  channel::{ChartRenderer, Clock, Coach, OpenAiCoach, SystemClock},
  config::Config,
  prelude::*,
  scheduler::{self, Scheduler, Ticks},
  sv,
};

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub profile: sv::Profile<'a>,
  pub settings: sv::Settings<'a>,
  pub daily: sv::Daily<'a>,
  pub workout: sv::Workout<'a>,
  pub strength: sv::Strength<'a>,
  pub insight: sv::Insight<'a>,
}

impl<'a> Services<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self {
      user: sv::User::new(db),
      profile: sv::Profile::new(db),
      settings: sv::Settings::new(db),
      daily: sv::Daily::new(db),
      workout: sv::Workout::new(db),
      strength: sv::Strength::new(db),
      insight: sv::Insight::new(db),
    }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub bot: Bot,
  pub config: Config,
  pub coach: Arc<dyn Coach>,
  /// No renderer ships, reports go out without images
  pub charts: Option<Arc<dyn ChartRenderer>>,
  pub clock: Arc<dyn Clock>,
  pub ticks: Ticks,
  pub shutdown: CancellationToken,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let coach = OpenAiCoach::from_config(&config.coach)
      .context("Failed to build coach client")?;

    Ok(Self {
      db,
      bot: Bot::new(&config.bot_token),
      coach,
      charts: None,
      clock: Arc::new(SystemClock),
      ticks: Arc::new(DashMap::new()),
      shutdown: CancellationToken::new(),
      config,
    })
  }

  pub fn sv(&self) -> Services<'_> {
    Services::new(&self.db)
  }

  /// Scheduler delivering through the bot, reporting into `ticks`.
  pub fn scheduler(&self) -> Scheduler {
    Scheduler::new(
      self.db.clone(),
      Arc::new(self.bot.clone()),
      self.coach.clone(),
      self.charts.clone(),
      self.clock.clone(),
      self.config.scheduler.clone(),
    )
    .with_ticks(self.ticks.clone())
  }

  /// Calendar date on the user's wall clock.
  pub async fn today(&self, tg_user_id: i64) -> Result<Date> {
    let settings = self.sv().settings.get(tg_user_id).await?;
    let local = scheduler::cadence::local_now(
      self.clock.now(),
      &settings,
      self.config.scheduler.default_timezone,
    );
    Ok(local.date())
  }
}
