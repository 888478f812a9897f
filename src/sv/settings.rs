use chrono::Weekday;
use chrono_tz::Tz;

use crate::{entity::settings, prelude::*};

pub const DEFAULT_TIMEZONE: &str = "Asia/Yerevan";
pub const DEFAULT_WEIGH_DAY: Weekday = Weekday::Sun;

/// Keys accepted by `/set`
pub const KEYS: [&str; 8] = [
  "timezone",
  "weigh_day",
  "weigh_time",
  "daily_time",
  "report_time",
  "weight_loss_pct",
  "low_calories_pct",
  "coach",
];

fn hm(hour: u32, min: u32) -> Time {
  Time::from_hms_opt(hour, min, 0).unwrap_or_default()
}

pub fn defaults(tg_user_id: i64) -> settings::Model {
  settings::Model {
    tg_user_id,
    timezone: DEFAULT_TIMEZONE.into(),
    weigh_day: weekday_name(DEFAULT_WEIGH_DAY).into(),
    weigh_time: hm(10, 0),
    daily_summary_time: hm(21, 30),
    weekly_report_time: hm(19, 0),
    weight_loss_pct: dec!(1.0),
    low_calories_pct: dec!(0.70),
    use_ai_coach: true,
  }
}

pub fn weekday_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "monday",
    Weekday::Tue => "tuesday",
    Weekday::Wed => "wednesday",
    Weekday::Thu => "thursday",
    Weekday::Fri => "friday",
    Weekday::Sat => "saturday",
    Weekday::Sun => "sunday",
  }
}

/// Partial update, `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
  pub timezone: Option<String>,
  pub weigh_day: Option<Weekday>,
  pub weigh_time: Option<Time>,
  pub daily_summary_time: Option<Time>,
  pub weekly_report_time: Option<Time>,
  pub weight_loss_pct: Option<Decimal>,
  pub low_calories_pct: Option<Decimal>,
  pub use_ai_coach: Option<bool>,
}

fn parse_time(value: &str) -> Result<Time> {
  Time::parse_from_str(value, "%H:%M")
    .map_err(|_| Error::invalid(format!("`{value}` is not a HH:MM time")))
}

fn parse_decimal(value: &str) -> Result<Decimal> {
  value
    .replace(',', ".")
    .parse::<Decimal>()
    .map_err(|_| Error::invalid(format!("`{value}` is not a number")))
}

impl SettingsPatch {
  /// Single-field patch out of a `/set <key> <value>` pair.
  pub fn parse(key: &str, value: &str) -> Result<Self> {
    let value = value.trim();
    let mut patch = Self::default();

    match key {
      "timezone" => {
        let tz: Tz = value
          .parse()
          .map_err(|_| Error::UnknownTimezone(value.to_string()))?;
        patch.timezone = Some(tz.name().to_string());
      }
      "weigh_day" => {
        let day: Weekday = value
          .parse()
          .map_err(|_| Error::invalid(format!("`{value}` is not a weekday")))?;
        patch.weigh_day = Some(day);
      }
      "weigh_time" => patch.weigh_time = Some(parse_time(value)?),
      "daily_time" => patch.daily_summary_time = Some(parse_time(value)?),
      "report_time" => patch.weekly_report_time = Some(parse_time(value)?),
      "weight_loss_pct" => {
        let pct = parse_decimal(value)?;
        if pct <= Decimal::ZERO || pct > dec!(10) {
          return Err(Error::invalid("weight_loss_pct must be within (0, 10]"));
        }
        patch.weight_loss_pct = Some(pct);
      }
      "low_calories_pct" => {
        let mut ratio = parse_decimal(value)?;
        // accept both 70 and 0.7
        if ratio > Decimal::ONE {
          ratio /= dec!(100);
        }
        if ratio <= Decimal::ZERO || ratio >= Decimal::ONE {
          return Err(Error::invalid("low_calories_pct must be within (0, 100)"));
        }
        patch.low_calories_pct = Some(ratio);
      }
      "coach" => {
        patch.use_ai_coach = Some(match value.to_lowercase().as_str() {
          "on" | "true" | "yes" | "1" => true,
          "off" | "false" | "no" | "0" => false,
          _ => return Err(Error::invalid("coach takes `on` or `off`")),
        });
      }
      _ => {
        return Err(Error::invalid(format!(
          "Unknown key `{key}`. Known keys: {}",
          KEYS.join(", ")
        )));
      }
    }
    Ok(patch)
  }
}

pub struct Settings<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Settings<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Stored settings, created with defaults on first access.
  pub async fn get(&self, tg_user_id: i64) -> Result<settings::Model> {
    if let Some(settings) =
      settings::Entity::find_by_id(tg_user_id).one(self.db).await?
    {
      return Ok(settings);
    }

    let settings = settings::ActiveModel::from(defaults(tg_user_id))
      .reset_all()
      .insert(self.db)
      .await?;
    Ok(settings)
  }

  pub async fn update(
    &self,
    tg_user_id: i64,
    patch: SettingsPatch,
  ) -> Result<settings::Model> {
    let current = self.get(tg_user_id).await?;
    let mut model = settings::ActiveModel::from(current);

    if let Some(timezone) = patch.timezone {
      model.timezone = Set(timezone);
    }
    if let Some(day) = patch.weigh_day {
      model.weigh_day = Set(weekday_name(day).to_string());
    }
    if let Some(time) = patch.weigh_time {
      model.weigh_time = Set(time);
    }
    if let Some(time) = patch.daily_summary_time {
      model.daily_summary_time = Set(time);
    }
    if let Some(time) = patch.weekly_report_time {
      model.weekly_report_time = Set(time);
    }
    if let Some(pct) = patch.weight_loss_pct {
      model.weight_loss_pct = Set(pct);
    }
    if let Some(ratio) = patch.low_calories_pct {
      model.low_calories_pct = Set(ratio);
    }
    if let Some(enabled) = patch.use_ai_coach {
      model.use_ai_coach = Set(enabled);
    }

    Ok(model.update(self.db).await?)
  }
}
