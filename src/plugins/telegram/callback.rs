use teloxide::prelude::*;

use super::ReplyBot;
use crate::{
  channel::Callback,
  insight::{TargetSet, report},
  prelude::*,
  state::{AppState, Services},
};

/// Command to use after pressing a button
pub fn hint(callback: Callback) -> &'static str {
  match callback {
    Callback::LogWeight => {
      "⚖️ Send /weight &lt;kg&gt;, e.g. <code>/weight 80.4</code>"
    }
    Callback::LogCalories => {
      "🍽 Send /eat &lt;kcal&gt; [what], e.g. <code>/eat 450 oatmeal</code>"
    }
    Callback::LogWater => {
      "💧 Send /water &lt;ml&gt;, e.g. <code>/water 1800</code>"
    }
    Callback::LogSleep => {
      "😴 Send /sleep &lt;hours&gt;, e.g. <code>/sleep 7.5</code>"
    }
    Callback::LogDone => "✅ Great job today, see you tomorrow!",
    Callback::AlertAck => "👌 Noted.",
    Callback::AlertAdjust => {
      "🔧 Re-run /profile with a gentler pace, e.g. \
       <code>/profile m 30 180 85 moderate cut gentle</code>"
    }
    Callback::AlertShowPlan => "📋 Set up your plan with /profile first.",
    Callback::AlertLogWorkout => {
      "🏋️ Send /workout &lt;gym|cardio|walking|other&gt; &lt;minutes&gt; [kcal]"
    }
  }
}

async fn answer(
  sv: &Services<'_>,
  user: i64,
  callback: Callback,
) -> Result<String> {
  if callback == Callback::AlertShowPlan
    && let Some(targets) = sv.profile.targets(user).await?
  {
    return Ok(report::targets(&TargetSet {
      bmr: targets.bmr,
      tdee: targets.tdee,
      target_calories: targets.target_calories,
      protein_g: targets.protein_g,
      fat_g: targets.fat_g,
      carbs_g: targets.carbs_g,
      deficit_pct: targets.deficit_pct.round_dp(2),
    }));
  }
  Ok(hint(callback).to_string())
}

pub async fn handle(
  app: Arc<AppState>,
  bot: ReplyBot,
  data: &str,
) -> ResponseResult<()> {
  let Some(callback) = Callback::from_data(data) else {
    debug!(user = bot.user_id, data, "Unknown callback");
    return Ok(());
  };

  match answer(&app.sv(), bot.user_id, callback).await {
    Ok(text) => {
      bot.reply_html(text).await?;
    }
    Err(err) => {
      error!(user = bot.user_id, "Callback failed: {err}");
      bot.reply_html("❌ Something went wrong, try again later.").await?;
    }
  }
  Ok(())
}
