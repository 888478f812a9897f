//! In-process fakes for scheduler and command tests

use std::sync::Mutex;

use chrono::DateTime as UtcDateTime;
use teloxide::{ApiError, RequestError};

use super::{Action, ChartRenderer, Clock, Coach, Messenger};
use crate::{
  insight::{ExerciseProgress, WeeklyStats, WeightTrend},
  prelude::*,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
  Text { chat_id: i64, text: String, actions: Vec<Action> },
  Image { chat_id: i64, caption: String },
}

impl Sent {
  pub fn chat_id(&self) -> i64 {
    match self {
      Sent::Text { chat_id, .. } | Sent::Image { chat_id, .. } => *chat_id,
    }
  }

  pub fn text(&self) -> &str {
    match self {
      Sent::Text { text, .. } => text,
      Sent::Image { caption, .. } => caption,
    }
  }
}

/// Records every delivery; chats listed in `failing` get an error instead,
/// chats in `blocked` get the error Telegram returns for a blocked bot.
/// With `blocked_after` every chat turns blocked once that many texts went out.
#[derive(Default)]
pub struct RecordingMessenger {
  pub sent: Mutex<Vec<Sent>>,
  pub failing: Vec<i64>,
  pub blocked: Vec<i64>,
  pub blocked_after: Option<usize>,
  pub failing_images: bool,
  pub delay: Option<Duration>,
}

impl RecordingMessenger {
  pub fn failing_for(chat_ids: &[i64]) -> Self {
    Self { failing: chat_ids.to_vec(), ..Self::default() }
  }

  pub fn sent(&self) -> Vec<Sent> {
    self.sent.lock().unwrap().clone()
  }

  fn texts_sent(&self) -> usize {
    let sent = self.sent.lock().unwrap();
    sent.iter().filter(|sent| matches!(sent, Sent::Text { .. })).count()
  }

  pub fn texts_for(&self, chat_id: i64) -> Vec<String> {
    self
      .sent()
      .into_iter()
      .filter(|sent| sent.chat_id() == chat_id)
      .filter_map(|sent| match sent {
        Sent::Text { text, .. } => Some(text),
        Sent::Image { .. } => None,
      })
      .collect()
  }
}

#[async_trait]
impl Messenger for RecordingMessenger {
  async fn send(
    &self,
    chat_id: i64,
    text: &str,
    actions: &[Action],
  ) -> Result<()> {
    if let Some(delay) = self.delay {
      time::sleep(delay).await;
    }
    let exhausted = self
      .blocked_after
      .is_some_and(|limit| self.texts_sent() >= limit);
    if exhausted || self.blocked.contains(&chat_id) {
      return Err(Error::Telegram(RequestError::Api(ApiError::BotBlocked)));
    }
    if self.failing.contains(&chat_id) {
      return Err(Error::Internal(format!("chat {chat_id} is unreachable")));
    }
    self.sent.lock().unwrap().push(Sent::Text {
      chat_id,
      text: text.to_string(),
      actions: actions.to_vec(),
    });
    Ok(())
  }

  async fn send_image(
    &self,
    chat_id: i64,
    _image: Vec<u8>,
    caption: &str,
  ) -> Result<()> {
    if self.failing_images || self.failing.contains(&chat_id) {
      return Err(Error::Internal("image upload failed".into()));
    }
    self
      .sent
      .lock()
      .unwrap()
      .push(Sent::Image { chat_id, caption: caption.to_string() });
    Ok(())
  }
}

pub struct FixedClock(pub UtcDateTime<Utc>);

impl FixedClock {
  /// `YYYY-MM-DD HH:MM` in UTC
  pub fn at(raw: &str) -> Self {
    let naive = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").unwrap();
    Self(naive.and_utc())
  }
}

impl Clock for FixedClock {
  fn now(&self) -> UtcDateTime<Utc> {
    self.0
  }
}

pub struct StaticCoach(pub Option<String>);

#[async_trait]
impl Coach for StaticCoach {
  async fn comment(&self, _: &WeeklyStats) -> Option<String> {
    self.0.clone()
  }
}

/// Renders a fixed payload, or fails on every call.
pub struct FakeCharts {
  pub fail: bool,
}

impl ChartRenderer for FakeCharts {
  fn weight_chart(&self, trend: &WeightTrend) -> Result<Vec<u8>> {
    if self.fail {
      return Err(Error::Internal("renderer crashed".into()));
    }
    Ok(vec![0x89, b'P', b'N', b'G', trend.points.len() as u8])
  }

  fn progress_chart(&self, progress: &ExerciseProgress) -> Result<Vec<u8>> {
    if self.fail {
      return Err(Error::Internal("renderer crashed".into()));
    }
    Ok(vec![0x89, b'P', b'N', b'G', progress.samples.len() as u8])
  }
}
