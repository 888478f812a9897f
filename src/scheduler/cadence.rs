//! Matching per-user cadences against the current instant

use chrono::{DateTime as UtcDateTime, TimeZone, Weekday};
use chrono_tz::Tz;

use crate::{entity::settings, prelude::*, sv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
  WeighIn,
  DailySummary,
  WeeklyReport,
}

impl Cadence {
  pub const ALL: [Cadence; 3] =
    [Cadence::WeighIn, Cadence::DailySummary, Cadence::WeeklyReport];

  pub fn tag(self) -> &'static str {
    match self {
      Cadence::WeighIn => "weigh_in",
      Cadence::DailySummary => "daily_summary",
      Cadence::WeeklyReport => "weekly_report",
    }
  }

  fn configured(self, settings: &settings::Model) -> Time {
    match self {
      Cadence::WeighIn => settings.weigh_time,
      Cadence::DailySummary => settings.daily_summary_time,
      Cadence::WeeklyReport => settings.weekly_report_time,
    }
  }

  fn weekly(self) -> bool {
    matches!(self, Cadence::WeighIn | Cadence::WeeklyReport)
  }
}

/// Parses a stored zone name, falling back to `fallback` on garbage.
pub fn zone(name: &str, fallback: Tz) -> Tz {
  name.parse().unwrap_or_else(|_| {
    warn!(timezone = name, fallback = %fallback, "Unknown timezone, using fallback");
    fallback
  })
}

fn weigh_day(settings: &settings::Model) -> Weekday {
  settings.weigh_day.parse().unwrap_or_else(|_| {
    warn!(
      user = settings.tg_user_id,
      weigh_day = %settings.weigh_day,
      "Unknown weigh day, using default"
    );
    sv::settings::DEFAULT_WEIGH_DAY
  })
}

fn minute_of_day(time: Time) -> i64 {
  (time.hour() * 60 + time.minute()) as i64
}

/// Absolute distance in minutes, without wrapping around midnight.
pub fn within(configured: Time, current: Time, tolerance: i64) -> bool {
  (minute_of_day(configured) - minute_of_day(current)).abs() <= tolerance
}

/// The user's wall clock at `now`
pub fn local_now(
  now: UtcDateTime<Utc>,
  settings: &settings::Model,
  fallback: Tz,
) -> DateTime {
  now.with_timezone(&zone(&settings.timezone, fallback)).naive_local()
}

/// Cadences of one user that are due at the local instant `local`.
pub fn due(
  settings: &settings::Model,
  local: DateTime,
  tolerance: i64,
) -> Vec<Cadence> {
  let weekday = local.weekday();
  Cadence::ALL
    .into_iter()
    .filter(|cadence| {
      within(cadence.configured(settings), local.time(), tolerance)
        && (!cadence.weekly() || weigh_day(settings) == weekday)
    })
    .collect()
}

/// First multiple of `interval` since the epoch strictly after `now`.
pub fn next_boundary(
  now: UtcDateTime<Utc>,
  interval: Duration,
) -> UtcDateTime<Utc> {
  let step = interval.as_secs().max(1) as i64;
  let next = (now.timestamp().div_euclid(step) + 1) * step;
  UtcDateTime::from_timestamp(next, 0).unwrap_or(now)
}

/// Next `hour:00` in `tz` strictly after `now`.
pub fn next_daily(
  now: UtcDateTime<Utc>,
  hour: u32,
  tz: Tz,
) -> UtcDateTime<Utc> {
  let today = now.with_timezone(&tz).date_naive();
  let at = Time::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();

  // a DST gap can swallow the hour on one day, so look a few days ahead
  (0..3)
    .filter_map(|offset| {
      let date = today + TimeDelta::days(offset);
      tz.from_local_datetime(&date.and_time(at)).earliest()
    })
    .map(|local| local.with_timezone(&Utc))
    .find(|candidate| *candidate > now)
    .unwrap_or(now + TimeDelta::days(1))
}
