//! Environment-driven configuration

use std::env;

use chrono_tz::Tz;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
  /// Period of the reminder tick, ticks land on multiples of it
  pub tick_interval: Duration,
  /// Local hour (in `default_timezone`) of the once-daily alert tick
  pub alert_hour: u32,
  /// Allowed distance in minutes between configured and current time
  pub tolerance_minutes: i64,
  /// Zone used when a user's zone cannot be parsed
  pub default_timezone: Tz,
  /// Per-tick bound on concurrently processed users
  pub concurrency: usize,
  /// Upper bound for one user's fetch-compute-send work item
  pub send_timeout: Duration,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      tick_interval: Duration::from_secs(30 * 60),
      alert_hour: 12,
      tolerance_minutes: 5,
      default_timezone: chrono_tz::Asia::Yerevan,
      concurrency: 16,
      send_timeout: Duration::from_secs(30),
    }
  }
}

#[derive(Debug, Clone)]
pub struct CoachConfig {
  pub api_key: Option<String>,
  pub model: String,
  pub base_url: String,
}

impl Default for CoachConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      model: String::from("gpt-4o-mini"),
      base_url: String::from("https://api.openai.com/v1"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub bot_token: String,
  pub port: u16,
  pub coach: CoachConfig,
  pub scheduler: SchedulerConfig,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let bot_token = env::var("TELOXIDE_TOKEN").context("TELOXIDE_TOKEN not set")?;
    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:fitcoach.db?mode=rwc".into());
    let port = parse_var("PORT")?.unwrap_or(3000);

    let mut scheduler = SchedulerConfig::default();
    if let Some(interval) = duration_var("TICK_INTERVAL")? {
      scheduler.tick_interval = interval;
    }
    if let Some(timeout) = duration_var("SEND_TIMEOUT")? {
      scheduler.send_timeout = timeout;
    }
    if let Some(hour) = parse_var::<u32>("ALERT_HOUR")? {
      anyhow::ensure!(hour < 24, "ALERT_HOUR must be within 0..24");
      scheduler.alert_hour = hour;
    }
    if let Some(tolerance) = parse_var("MATCH_TOLERANCE_MINUTES")? {
      scheduler.tolerance_minutes = tolerance;
    }
    if let Some(concurrency) = parse_var::<usize>("DISPATCH_CONCURRENCY")? {
      scheduler.concurrency = concurrency.max(1);
    }
    if let Ok(tz) = env::var("DEFAULT_TIMEZONE") {
      scheduler.default_timezone = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown DEFAULT_TIMEZONE `{tz}`"))?;
    }

    let mut coach = CoachConfig {
      api_key: env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty()),
      ..CoachConfig::default()
    };
    if let Ok(model) = env::var("OPENAI_MODEL") {
      coach.model = model;
    }
    if let Ok(url) = env::var("OPENAI_BASE_URL") {
      coach.base_url = url.trim_end_matches('/').to_string();
    }

    Ok(Self { database_url, bot_token, port, coach, scheduler })
  }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> anyhow::Result<Option<T>> {
  match env::var(key) {
    Ok(raw) => raw
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| anyhow::anyhow!("Invalid value for {key}: `{raw}`")),
    Err(_) => Ok(None),
  }
}

fn duration_var(key: &str) -> anyhow::Result<Option<Duration>> {
  match env::var(key) {
    Ok(raw) => humantime::parse_duration(raw.trim())
      .map(Some)
      .with_context(|| format!("Invalid duration for {key}: `{raw}`")),
    Err(_) => Ok(None),
  }
}
