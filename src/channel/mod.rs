//! Outbound collaborators: chat delivery, coaching text, charts and time

pub mod coach;
pub mod telegram;
#[cfg(test)]
pub mod testing;

use chrono::DateTime as UtcDateTime;

pub use coach::OpenAiCoach;

use crate::{
  insight::{ExerciseProgress, WeeklyStats, WeightTrend},
  prelude::*,
};

/// Callback data enum - provides type-safe callback handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
  LogWeight,
  LogCalories,
  LogWater,
  LogSleep,
  LogDone,
  AlertAck,
  AlertAdjust,
  AlertShowPlan,
  AlertLogWorkout,
}

impl Callback {
  /// Serialize callback to string for Telegram API
  pub fn to_data(self) -> &'static str {
    match self {
      Callback::LogWeight => "log_weight",
      Callback::LogCalories => "log_calories",
      Callback::LogWater => "log_water",
      Callback::LogSleep => "log_sleep",
      Callback::LogDone => "log_done",
      Callback::AlertAck => "alert_ack",
      Callback::AlertAdjust => "alert_adjust",
      Callback::AlertShowPlan => "alert_show_plan",
      Callback::AlertLogWorkout => "alert_log_workout",
    }
  }

  /// Parse callback from string received from Telegram API
  pub fn from_data(data: &str) -> Option<Self> {
    match data {
      "log_weight" => Some(Callback::LogWeight),
      "log_calories" => Some(Callback::LogCalories),
      "log_water" => Some(Callback::LogWater),
      "log_sleep" => Some(Callback::LogSleep),
      "log_done" => Some(Callback::LogDone),
      "alert_ack" => Some(Callback::AlertAck),
      "alert_adjust" => Some(Callback::AlertAdjust),
      "alert_show_plan" => Some(Callback::AlertShowPlan),
      "alert_log_workout" => Some(Callback::AlertLogWorkout),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Callback::LogWeight => "⚖️ Log weight",
      Callback::LogCalories => "🍽 Log calories",
      Callback::LogWater => "💧 Log water",
      Callback::LogSleep => "😴 Log sleep",
      Callback::LogDone => "✅ All logged",
      Callback::AlertAck => "👌 Got it",
      Callback::AlertAdjust => "🔧 Adjust plan",
      Callback::AlertShowPlan => "📋 Show plan",
      Callback::AlertLogWorkout => "🏋️ Log workout",
    }
  }

  pub fn action(self) -> Action {
    Action { label: self.label().into(), data: self.to_data().into() }
  }
}

/// Buttons under the weigh-in prompt
pub fn weigh_in_actions() -> Vec<Action> {
  vec![Callback::LogWeight.action()]
}

/// Buttons under the end-of-day prompt
pub fn logging_actions() -> Vec<Action> {
  [
    Callback::LogWeight,
    Callback::LogCalories,
    Callback::LogWater,
    Callback::LogSleep,
    Callback::LogDone,
  ]
  .into_iter()
  .map(Callback::action)
  .collect()
}

/// An inline button attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  pub label: String,
  pub data: String,
}

#[async_trait]
pub trait Messenger: Send + Sync {
  async fn send(&self, chat_id: i64, text: &str, actions: &[Action])
  -> Result<()>;

  async fn send_image(
    &self,
    chat_id: i64,
    image: Vec<u8>,
    caption: &str,
  ) -> Result<()>;
}

/// Short free-form commentary on a week. Never fails: `None` means no blurb.
#[async_trait]
pub trait Coach: Send + Sync {
  async fn comment(&self, stats: &WeeklyStats) -> Option<String>;
}

/// PNG rendering of trends.
pub trait ChartRenderer: Send + Sync {
  fn weight_chart(&self, trend: &WeightTrend) -> Result<Vec<u8>>;

  fn progress_chart(&self, progress: &ExerciseProgress) -> Result<Vec<u8>>;
}

pub trait Clock: Send + Sync {
  fn now(&self) -> UtcDateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> UtcDateTime<Utc> {
    Utc::now()
  }
}
