//! Pure analytics over a user's recorded history
//!
//! Nothing here touches storage or the network: callers load history through
//! `sv::Insight` and pass plain samples in.

pub mod aggregate;
pub mod alerts;
pub mod calculator;
pub mod report;

pub use aggregate::{
  DailySummary, ExerciseProgress, MonthlyStats, WeeklyStats, WeightTrend,
};
pub use alerts::{Alert, AlertContext, Thresholds};
pub use calculator::{ProfileInput, TargetSet};

use crate::{
  entity::{daily_record, strength},
  prelude::*,
};

/// One calendar day of logged values
#[derive(Debug, Clone, PartialEq)]
pub struct DaySample {
  pub date: Date,
  pub weight: Option<Decimal>,
  pub calories: Option<i32>,
  pub water_ml: Option<i32>,
  pub sleep_hours: Option<Decimal>,
}

#[cfg(test)]
impl DaySample {
  pub fn empty(date: Date) -> Self {
    Self { date, weight: None, calories: None, water_ml: None, sleep_hours: None }
  }
}

impl From<&daily_record::Model> for DaySample {
  fn from(record: &daily_record::Model) -> Self {
    Self {
      date: record.date,
      // sqlite hands decimals back through f64
      weight: record.weight_kg.map(|w| w.round_dp(2).normalize()),
      calories: record.calories,
      water_ml: record.water_ml,
      sleep_hours: record.sleep_hours.map(|h| h.round_dp(1).normalize()),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiftSample {
  pub date: Date,
  pub exercise: String,
  pub weight: Decimal,
  pub e1rm: Decimal,
}

impl From<&strength::Model> for LiftSample {
  fn from(record: &strength::Model) -> Self {
    Self {
      date: record.date,
      exercise: record.exercise.clone(),
      weight: record.weight_kg.round_dp(2).normalize(),
      e1rm: record.e1rm.round_dp(2).normalize(),
    }
  }
}

/// `(change / base) * 100`, undefined for a zero base.
pub fn percent_of(change: Decimal, base: Decimal) -> Option<Decimal> {
  if base.is_zero() {
    return None;
  }
  change.checked_div(base)?.checked_mul(dec!(100))
}
