//! Weekly commentary from an OpenAI-compatible chat completions endpoint

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Coach;
use crate::{config::CoachConfig, insight::WeeklyStats, prelude::*};

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const SYSTEM_PROMPT: &str = "You are a fitness coach bot. Give a short, \
  motivating comment on the user's weekly report. Be friendly without \
  overdoing it and be specific: give actionable advice. \
  Answer in 2-4 sentences, no more.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 2],
  max_tokens: u32,
  temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
  content: Option<String>,
}

pub struct OpenAiCoach {
  client: Client,
  api_key: String,
  model: String,
  endpoint: String,
}

impl OpenAiCoach {
  pub fn new(api_key: String, config: &CoachConfig) -> Result<Self> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(Self {
      client,
      api_key,
      model: config.model.clone(),
      endpoint: format!("{}/chat/completions", config.base_url),
    })
  }

  /// A live coach when a key is configured, a silent one otherwise.
  pub fn from_config(config: &CoachConfig) -> Result<Arc<dyn Coach>> {
    Ok(match &config.api_key {
      Some(key) => Arc::new(Self::new(key.clone(), config)?),
      None => {
        info!("OPENAI_API_KEY not set, coach comments disabled");
        Arc::new(NoCoach)
      }
    })
  }

  async fn complete(&self, prompt: &str) -> Result<Option<String>> {
    let request = ChatRequest {
      model: &self.model,
      messages: [
        ChatMessage { role: "system", content: SYSTEM_PROMPT },
        ChatMessage { role: "user", content: prompt },
      ],
      max_tokens: MAX_TOKENS,
      temperature: TEMPERATURE,
    };

    let response: ChatResponse = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    Ok(
      response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()),
    )
  }
}

#[async_trait]
impl Coach for OpenAiCoach {
  async fn comment(&self, stats: &WeeklyStats) -> Option<String> {
    match self.complete(&prompt(stats)).await {
      Ok(comment) => comment,
      Err(err) => {
        warn!("Failed to get coach comment: {err}");
        None
      }
    }
  }
}

pub struct NoCoach;

#[async_trait]
impl Coach for NoCoach {
  async fn comment(&self, _: &WeeklyStats) -> Option<String> {
    None
  }
}

/// Plain-text digest of the week handed to the model.
pub fn prompt(stats: &WeeklyStats) -> String {
  let mut parts = vec![format!(
    "Weekly report of the user ({} - {}):",
    stats.start_date, stats.end_date
  )];

  if let (Some(start), Some(end)) = (stats.weight.start, stats.weight.end) {
    let mut line = format!(
      "- Weight: {} -> {} kg",
      utils::decimal(start, 1),
      utils::decimal(end, 1)
    );
    if let (Some(change), Some(pct)) =
      (stats.weight.change, stats.weight.change_pct)
    {
      line.push_str(&format!(
        " ({} kg, {}%)",
        utils::signed(change, 1),
        utils::signed(pct, 1)
      ));
    }
    parts.push(line);
  }
  if let (Some(avg), Some(target)) = (stats.avg_calories, stats.target_calories)
  {
    parts.push(format!("- Calories: {avg}/day on average (plan {target})"));
    if let Some(deficit) = stats.calorie_deficit.filter(|d| *d != 0) {
      parts.push(format!("- Weekly deficit: {deficit} kcal"));
    }
  }
  if let Some(water) = stats.avg_water_ml {
    parts.push(format!("- Water: {water} ml/day on average"));
  }
  if let Some(sleep) = stats.avg_sleep_hours {
    parts.push(format!("- Sleep: {} h on average", utils::decimal(sleep, 1)));
  }
  parts.push(format!(
    "- Workouts: {} of {} planned",
    stats.workouts_done, stats.workouts_planned
  ));
  if stats.streak_weeks > 0 {
    parts.push(format!(
      "- Streak: {} weeks in a row with workouts",
      stats.streak_weeks
    ));
  }
  parts.push(
    "\nGive a short comment and one concrete tip for the next week.".into(),
  );
  parts.join("\n")
}
