//! Threshold alerts over recent history
//!
//! Each rule looks at an [`AlertContext`] on its own. A rule that fails is
//! logged and skipped, the remaining rules still run.

use super::{DaySample, percent_of};
use crate::{channel::Callback, prelude::*};

pub const DEFAULT_WEIGHT_LOSS_PCT: Decimal = dec!(1.0);
pub const DEFAULT_LOW_CALORIES_RATIO: Decimal = dec!(0.70);
pub const MISSED_WORKOUT_DAYS: i64 = 5;
const LOW_CALORIE_DAYS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
  RapidWeightLoss,
  LowCalories,
  MissedWorkouts,
}

impl AlertKind {
  pub fn tag(self) -> &'static str {
    match self {
      AlertKind::RapidWeightLoss => "rapid_weight_loss",
      AlertKind::LowCalories => "low_calories",
      AlertKind::MissedWorkouts => "missed_workouts",
    }
  }

  pub fn icon(self) -> &'static str {
    match self {
      AlertKind::RapidWeightLoss => "⚠️",
      AlertKind::LowCalories => "🤔",
      AlertKind::MissedWorkouts => "💪",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      AlertKind::RapidWeightLoss => "Rapid weight loss",
      AlertKind::LowCalories => "Too few calories",
      AlertKind::MissedWorkouts => "Missed workouts",
    }
  }

  /// Buttons offered under the alert message
  pub fn actions(self) -> Vec<Callback> {
    match self {
      AlertKind::RapidWeightLoss => {
        vec![Callback::AlertAdjust, Callback::AlertAck]
      }
      AlertKind::LowCalories => vec![Callback::AlertShowPlan, Callback::AlertAck],
      AlertKind::MissedWorkouts => {
        vec![Callback::AlertLogWorkout, Callback::AlertAck]
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
  pub kind: AlertKind,
  pub message: String,
  pub recommendation: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
  /// Weekly loss in percent of body weight above which to warn
  pub weight_loss_pct: Decimal,
  /// Fraction of the calorie target below which a day counts as low
  pub low_calories_ratio: Decimal,
}

impl Default for Thresholds {
  fn default() -> Self {
    Self {
      weight_loss_pct: DEFAULT_WEIGHT_LOSS_PCT,
      low_calories_ratio: DEFAULT_LOW_CALORIES_RATIO,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightPoint {
  pub date: Date,
  pub weight: Decimal,
}

/// Everything the rules may look at for one user on one day
#[derive(Debug, Clone)]
pub struct AlertContext {
  pub today: Date,
  pub latest_weight: Option<WeightPoint>,
  /// Latest sample on or before `today - 7`
  pub week_ago_weight: Option<WeightPoint>,
  /// Daily records of at least the last three days
  pub recent_days: Vec<DaySample>,
  pub last_workout: Option<Date>,
  pub target_calories: Option<i32>,
  pub thresholds: Thresholds,
}

#[cfg(test)]
impl AlertContext {
  /// Builds a context out of a complete history.
  pub fn from_history(
    today: Date,
    days: &[DaySample],
    workouts: &[Date],
    target_calories: Option<i32>,
    thresholds: Thresholds,
  ) -> Self {
    let weighed = |until: Date| {
      days
        .iter()
        .filter(|day| day.date <= until)
        .filter_map(|day| {
          day.weight.map(|weight| WeightPoint { date: day.date, weight })
        })
        .max_by_key(|point| point.date)
    };

    let recent_from = today - TimeDelta::days(LOW_CALORIE_DAYS as i64 - 1);
    Self {
      today,
      latest_weight: weighed(today),
      week_ago_weight: weighed(today - TimeDelta::days(7)),
      recent_days: days
        .iter()
        .filter(|day| day.date >= recent_from && day.date <= today)
        .cloned()
        .collect(),
      last_workout: workouts.iter().filter(|date| **date <= today).max().copied(),
      target_calories,
      thresholds,
    }
  }
}

trait Rule {
  fn kind(&self) -> AlertKind;

  fn check(&self, ctx: &AlertContext) -> Result<Option<Alert>>;
}

struct RapidWeightLoss;

impl Rule for RapidWeightLoss {
  fn kind(&self) -> AlertKind {
    AlertKind::RapidWeightLoss
  }

  fn check(&self, ctx: &AlertContext) -> Result<Option<Alert>> {
    let (Some(latest), Some(week_ago)) = (ctx.latest_weight, ctx.week_ago_weight)
    else {
      return Ok(None);
    };
    if latest.date <= week_ago.date {
      return Ok(None);
    }

    let loss = week_ago
      .weight
      .checked_sub(latest.weight)
      .ok_or_else(|| Error::Internal("weight difference out of range".into()))?;
    let Some(loss_pct) = percent_of(loss, week_ago.weight) else {
      return Ok(None);
    };
    if loss_pct <= ctx.thresholds.weight_loss_pct {
      return Ok(None);
    }

    Ok(Some(Alert {
      kind: self.kind(),
      message: format!(
        "You lost {} kg in a week ({}% of body weight).\n\
         That is faster than the recommended 0.5-1% per week.",
        utils::decimal(loss, 1),
        utils::decimal(loss_pct, 1)
      ),
      recommendation: "Risks: muscle loss and a slower metabolism.\n\
         Recommendation: add 150-200 kcal to your daily target.",
    }))
  }
}

struct LowCalories;

impl Rule for LowCalories {
  fn kind(&self) -> AlertKind {
    AlertKind::LowCalories
  }

  fn check(&self, ctx: &AlertContext) -> Result<Option<Alert>> {
    let Some(target) = ctx.target_calories.filter(|target| *target > 0) else {
      return Ok(None);
    };

    let from = ctx.today - TimeDelta::days(LOW_CALORIE_DAYS as i64 - 1);
    let logged: Vec<i32> = ctx
      .recent_days
      .iter()
      .filter(|day| day.date >= from && day.date <= ctx.today)
      .filter_map(|day| day.calories)
      .collect();
    if logged.len() < LOW_CALORIE_DAYS {
      return Ok(None);
    }

    let threshold: i32 = Decimal::from(target)
      .checked_mul(ctx.thresholds.low_calories_ratio)
      .and_then(|threshold| threshold.trunc().try_into().ok())
      .ok_or_else(|| {
        Error::Internal("calorie threshold out of range".into())
      })?;
    if !logged.iter().all(|calories| *calories < threshold) {
      return Ok(None);
    }

    let average = logged.iter().map(|c| *c as i64).sum::<i64>()
      / logged.len() as i64;
    Ok(Some(Alert {
      kind: self.kind(),
      message: format!(
        "Three days in a row under {threshold} kcal (average {average}).\n\
         Your plan is {target} kcal, a deficit this deep works against you."
      ),
      recommendation: "Don't starve yourself, \
         it slows recovery and burns muscle.",
    }))
  }
}

struct MissedWorkouts;

impl Rule for MissedWorkouts {
  fn kind(&self) -> AlertKind {
    AlertKind::MissedWorkouts
  }

  fn check(&self, ctx: &AlertContext) -> Result<Option<Alert>> {
    let Some(last) = ctx.last_workout else {
      return Ok(None);
    };

    let days = (ctx.today - last).num_days();
    if days < MISSED_WORKOUT_DAYS {
      return Ok(None);
    }

    Ok(Some(Alert {
      kind: self.kind(),
      message: format!(
        "{days} days without a workout.\n\
         It happens, just don't let it become a habit."
      ),
      recommendation: "Plan for the week:\n\
         • Mon: gym (upper body)\n\
         • Wed: gym (lower body)\n\
         • Sat: cardio or a 30 min walk",
    }))
  }
}

const RULES: [&dyn Rule; 3] = [&RapidWeightLoss, &LowCalories, &MissedWorkouts];

/// Runs every rule and collects the alerts that fired, in rule order.
pub fn evaluate(ctx: &AlertContext) -> Vec<Alert> {
  RULES
    .iter()
    .filter_map(|rule| match rule.check(ctx) {
      Ok(alert) => alert,
      Err(err) => {
        warn!(rule = rule.kind().tag(), "Alert rule failed: {err}");
        None
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(day: u32) -> Date {
    Date::from_ymd_opt(2026, 3, day).unwrap()
  }

  fn weighed(day: u32, weight: Decimal) -> DaySample {
    DaySample { weight: Some(weight), ..DaySample::empty(date(day)) }
  }

  fn eaten(day: u32, calories: i32) -> DaySample {
    DaySample { calories: Some(calories), ..DaySample::empty(date(day)) }
  }

  fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
    alerts.iter().map(|alert| alert.kind).collect()
  }

  #[test]
  fn test_rapid_weight_loss_fires() {
    let days = [weighed(1, dec!(81.2)), weighed(8, dec!(80.0))];
    let ctx = AlertContext::from_history(
      date(8),
      &days,
      &[date(7)],
      Some(2000),
      Thresholds::default(),
    );

    let alerts = evaluate(&ctx);
    assert_eq!(kinds(&alerts), [AlertKind::RapidWeightLoss]);
    assert!(alerts[0].message.contains("1.2 kg"));
    assert!(alerts[0].message.contains("1.5%"));
  }

  #[test]
  fn test_weight_loss_threshold_is_per_user() {
    let days = [weighed(1, dec!(81.2)), weighed(8, dec!(80.0))];
    let thresholds =
      Thresholds { weight_loss_pct: dec!(2.0), ..Thresholds::default() };
    let ctx =
      AlertContext::from_history(date(8), &days, &[], None, thresholds);

    assert!(evaluate(&ctx).is_empty());
  }

  #[test]
  fn test_week_ago_picks_nearest_older_sample() {
    let days = [
      weighed(1, dec!(90)),
      weighed(2, dec!(81)),
      weighed(5, dec!(85)),
      weighed(9, dec!(80.5)),
    ];
    let ctx = AlertContext::from_history(
      date(9),
      &days,
      &[],
      None,
      Thresholds::default(),
    );

    assert_eq!(ctx.week_ago_weight.map(|p| p.date), Some(date(2)));
    // (81 - 80.5) / 81 is below one percent
    assert!(evaluate(&ctx).is_empty());
  }

  #[test]
  fn test_low_calories_fires() {
    let days = [eaten(6, 1100), eaten(7, 1200), eaten(8, 1150)];
    let ctx = AlertContext::from_history(
      date(8),
      &days,
      &[date(6)],
      Some(1800),
      Thresholds::default(),
    );

    let alerts = evaluate(&ctx);
    assert_eq!(kinds(&alerts), [AlertKind::LowCalories]);
    assert!(alerts[0].message.contains("1260"));
    assert!(alerts[0].message.contains("average 1150"));
  }

  #[test]
  fn test_low_calories_reference_week() {
    let days = [eaten(6, 1200), eaten(7, 1250), eaten(8, 1180)];
    let ctx = AlertContext::from_history(
      date(8),
      &days,
      &[],
      Some(1800),
      Thresholds::default(),
    );

    let alerts = evaluate(&ctx);
    assert_eq!(kinds(&alerts), [AlertKind::LowCalories]);
    assert!(alerts[0].message.contains("under 1260 kcal"));
    assert!(alerts[0].message.contains("average 1210"));
  }

  #[test]
  fn test_failing_rule_does_not_stop_others() {
    let days = [
      weighed(1, dec!(82)),
      DaySample { calories: Some(900), ..weighed(8, dec!(80)) },
      eaten(7, 900),
      eaten(6, 900),
    ];
    let thresholds =
      Thresholds { low_calories_ratio: Decimal::MAX, ..Thresholds::default() };
    let ctx = AlertContext::from_history(
      date(8),
      &days,
      &[date(1)],
      Some(2000),
      thresholds,
    );

    assert!(LowCalories.check(&ctx).is_err());
    assert_eq!(
      kinds(&evaluate(&ctx)),
      [AlertKind::RapidWeightLoss, AlertKind::MissedWorkouts]
    );
  }

  #[test]
  fn test_low_calories_needs_three_low_days() {
    let thresholds = Thresholds::default();

    let gap = [eaten(6, 1100), eaten(8, 1150)];
    let ctx = AlertContext::from_history(date(8), &gap, &[], Some(1800), thresholds);
    assert!(evaluate(&ctx).is_empty());

    let one_ok = [eaten(6, 1100), eaten(7, 1260), eaten(8, 1150)];
    let ctx =
      AlertContext::from_history(date(8), &one_ok, &[], Some(1800), thresholds);
    assert!(evaluate(&ctx).is_empty());

    let low = [eaten(6, 1100), eaten(7, 1200), eaten(8, 1150)];
    let ctx = AlertContext::from_history(date(8), &low, &[], None, thresholds);
    assert!(evaluate(&ctx).is_empty());
  }

  #[test]
  fn test_missed_workouts() {
    let thresholds = Thresholds::default();

    let ctx = AlertContext::from_history(date(9), &[], &[date(3)], None, thresholds);
    let alerts = evaluate(&ctx);
    assert_eq!(kinds(&alerts), [AlertKind::MissedWorkouts]);
    assert!(alerts[0].message.starts_with("6 days"));

    let ctx = AlertContext::from_history(date(9), &[], &[date(4)], None, thresholds);
    assert_eq!(evaluate(&ctx).len(), 1);

    let ctx = AlertContext::from_history(date(9), &[], &[date(5)], None, thresholds);
    assert!(evaluate(&ctx).is_empty());

    // never trained
    let ctx = AlertContext::from_history(date(9), &[], &[], None, thresholds);
    assert!(evaluate(&ctx).is_empty());
  }

  #[test]
  fn test_all_rules_fire_in_order() {
    let days = [
      weighed(1, dec!(82)),
      DaySample { calories: Some(900), ..weighed(8, dec!(80)) },
      eaten(7, 1000),
      eaten(6, 950),
    ];
    let ctx = AlertContext::from_history(
      date(8),
      &days,
      &[date(1)],
      Some(2000),
      Thresholds::default(),
    );

    let alerts = evaluate(&ctx);
    assert_eq!(
      kinds(&alerts),
      [
        AlertKind::RapidWeightLoss,
        AlertKind::LowCalories,
        AlertKind::MissedWorkouts
      ]
    );
    // unchanged input gives the same alerts again
    assert_eq!(evaluate(&ctx), alerts);
  }

  #[test]
  fn test_zero_weight_is_skipped() {
    let days = [weighed(1, Decimal::ZERO), weighed(8, dec!(80))];
    let ctx = AlertContext::from_history(
      date(8),
      &days,
      &[],
      None,
      Thresholds::default(),
    );
    assert!(evaluate(&ctx).is_empty());
  }
}
