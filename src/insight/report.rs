//! Telegram HTML rendering of computed insights

use teloxide::utils::html::escape;

use super::{
  Alert, DailySummary, ExerciseProgress, MonthlyStats, TargetSet, WeeklyStats,
  aggregate::WeightSpan,
};
use crate::prelude::*;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━";

fn signed(value: Decimal) -> String {
  utils::signed(value, 1)
}

fn weight_line(span: &WeightSpan) -> Option<String> {
  let (start, end) = (span.start?, span.end?);
  let mut line = format!(
    "⚖️ Weight: {} → {} kg",
    utils::decimal(start, 1),
    utils::decimal(end, 1)
  );
  match (span.change, span.change_pct) {
    (Some(change), Some(pct)) => {
      line.push_str(&format!(" ({} kg, {}%)", signed(change), signed(pct)))
    }
    (Some(change), None) => line.push_str(&format!(" ({} kg)", signed(change))),
    _ => {}
  }
  Some(line)
}

fn liters(ml: i32) -> String {
  utils::decimal(Decimal::from(ml) / dec!(1000), 1)
}

fn period(start: Date, end: Date) -> String {
  format!("{} - {}", start.format("%d.%m"), end.format("%d.%m"))
}

pub fn targets(targets: &TargetSet) -> String {
  let sign = if targets.deficit_pct > Decimal::ZERO { "-" } else { "+" };
  format!(
    "{RULE}\n\
     📊 <b>Your numbers</b>\n\
     • BMR: {} kcal\n\
     • TDEE: {} kcal\n\
     • Target: {} kcal/day ({sign}{}%)\n\n\
     🍽 <b>Daily macros</b>\n\
     • Protein: {}g (2.0 g/kg)\n\
     • Fat: {}g (0.9 g/kg)\n\
     • Carbs: {}g (the rest)\n\
     {RULE}\n\
     ⚠️ These are estimates, revisit them after 2-3 weeks of real data.",
    targets.bmr,
    targets.tdee,
    targets.target_calories,
    utils::decimal(targets.deficit_pct.abs(), 0),
    targets.protein_g,
    targets.fat_g,
    targets.carbs_g,
  )
}

pub fn daily_summary(summary: &DailySummary) -> String {
  let mut parts = vec![
    format!("📋 <b>Day summary ({})</b>", summary.date.format("%d.%m")),
    RULE.to_string(),
  ];

  let mut calories = format!("🍽 Eaten: {} kcal", summary.calories_eaten);
  if let Some(target) = summary.target_calories {
    calories.push_str(&format!(" of {target}"));
  }
  parts.push(calories);

  if summary.calories_burned > 0 {
    parts.push(format!(
      "🔥 Burned: {} kcal in {} workout(s)",
      summary.calories_burned, summary.workouts
    ));
    parts.push(format!("➖ Net: {} kcal", summary.calories_net));
  } else if summary.workouts > 0 {
    parts.push(format!("🏋️ Workouts: {}", summary.workouts));
  }
  if let Some(pct) = summary.percent_of_target {
    parts.push(format!("🎯 {pct}% of target"));
  }
  if let Some(water) = summary.water_ml {
    parts.push(format!("💧 Water: {} l", liters(water)));
  }
  if let Some(sleep) = summary.sleep_hours {
    parts.push(format!("😴 Sleep: {} h", utils::decimal(sleep, 1)));
  }
  parts.push(RULE.to_string());

  if let Some(recommendation) = summary.recommendation() {
    parts.push(recommendation);
  }
  if let Some(tip) = summary.tomorrow_tip() {
    parts.push(format!("\n{tip}"));
  }
  parts.join("\n")
}

/// Sent when nothing was logged today
pub fn daily_prompt() -> &'static str {
  "📋 <b>End of the day</b>\n\n\
   Nothing logged today yet. How did it go?"
}

pub fn weigh_in_prompt() -> &'static str {
  "⚖️ <b>Weigh-in time!</b>\n\n\
   Step on the scale in the morning, before breakfast, and send /weight &lt;kg&gt;."
}

pub fn weekly(stats: &WeeklyStats, coach: Option<&str>) -> String {
  let mut parts = vec![
    format!(
      "📊 <b>Weekly report ({})</b>",
      period(stats.start_date, stats.end_date)
    ),
    RULE.to_string(),
  ];

  parts.extend(weight_line(&stats.weight));

  if let Some(avg) = stats.avg_calories {
    let mut line = format!("🍽 Calories: {avg}/day on average");
    if let Some(target) = stats.target_calories {
      line.push_str(&format!(" (plan {target})"));
    }
    parts.push(line);
    if let Some(deficit) = stats.calorie_deficit.filter(|d| *d != 0) {
      let word = if deficit > 0 { "Deficit" } else { "Surplus" };
      parts.push(format!("   {word}: ~{} kcal this week", deficit.abs()));
    }
  }
  if let Some(water) = stats.avg_water_ml {
    parts.push(format!("💧 Water: {} l/day on average", liters(water)));
  }
  if let Some(sleep) = stats.avg_sleep_hours {
    parts.push(format!(
      "😴 Sleep: {} h on average",
      utils::decimal(sleep, 1)
    ));
  }
  parts.push(format!(
    "🏋️ Workouts: {} of {} planned",
    stats.workouts_done, stats.workouts_planned
  ));
  parts.push(RULE.to_string());

  if stats.streak_weeks > 0 {
    parts.push(format!(
      "🔥 Streak: {} week(s) in a row with workouts!",
      stats.streak_weeks
    ));
  }
  if let Some(comment) = coach {
    parts.push(String::new());
    parts.push("🤖 <b>Coach says:</b>".into());
    parts.push(format!("<i>{}</i>", escape(comment)));
  }
  parts.join("\n")
}

pub fn monthly(stats: &MonthlyStats) -> String {
  let mut parts = vec![
    format!(
      "📅 <b>Monthly summary ({})</b>",
      period(stats.start_date, stats.end_date)
    ),
    RULE.to_string(),
  ];

  parts.extend(weight_line(&stats.weight));
  if let Some(avg) = stats.avg_calories {
    parts.push(format!("🍽 Calories: {avg}/day on average"));
  }
  parts.push(format!("🏋️ Workouts in total: {}", stats.total_workouts));
  parts.push(format!("📈 Weeks with data: {} of 4", stats.weeks_with_data));
  parts.push(RULE.to_string());
  parts.join("\n")
}

pub fn alert(alert: &Alert) -> String {
  format!(
    "{} <b>{}!</b>\n\n{}\n\n{}",
    alert.kind.icon(),
    alert.kind.title(),
    alert.message,
    alert.recommendation
  )
}

pub fn progress(progress: &ExerciseProgress) -> String {
  let mut text = format!(
    "📊 <b>{}</b> over the last weeks:\n\
     • Max weight: {} kg → {} kg ({}%)\n\
     • e1RM: {} kg → {} kg ({}%)",
    escape(&progress.exercise),
    utils::decimal(progress.initial_weight, 0),
    utils::decimal(progress.max_weight, 0),
    progress.weight_change_pct.map(signed).unwrap_or_else(|| "0".into()),
    utils::decimal(progress.initial_e1rm, 0),
    utils::decimal(progress.max_e1rm, 0),
    progress.e1rm_change_pct.map(signed).unwrap_or_else(|| "0".into()),
  );

  match progress.e1rm_change_pct {
    Some(pct) if pct > dec!(5) => {
      text.push_str("\nSteady growth, keep the pace! 💪")
    }
    Some(pct) if pct > Decimal::ZERO => {
      text.push_str("\nThere is progress, keep going!")
    }
    _ => {}
  }
  text
}

/// Confirmation for a logged set, compared with the previous e1RM.
pub fn lift_logged(
  exercise: &str,
  weight: Decimal,
  reps: i32,
  sets: i32,
  e1rm: Decimal,
  previous_e1rm: Option<Decimal>,
) -> String {
  let mut text = format!(
    "✅ Logged! {}: {}kg × {reps} × {sets}\ne1RM: ~{} kg",
    escape(exercise),
    weight.normalize(),
    utils::decimal(e1rm, 0)
  );
  if let Some(previous) = previous_e1rm {
    let diff = e1rm - previous;
    if diff > Decimal::ZERO {
      text.push_str(&format!(
        " ({} kg since last time) 📈",
        utils::signed(diff, 0)
      ));
    } else if diff < Decimal::ZERO {
      text.push_str(&format!(" ({} kg)", utils::decimal(diff, 0)));
    }
  }
  text
}

pub fn streak(weeks: u32) -> String {
  if weeks == 0 {
    "No streak yet. One workout this week starts it!".into()
  } else {
    format!("🔥 Streak: {weeks} week(s) in a row with workouts!")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::insight::{DaySample, aggregate, alerts::AlertKind};

  fn date(day: u32) -> Date {
    Date::from_ymd_opt(2026, 3, day).unwrap()
  }

  #[test]
  fn test_weekly_report() {
    let stats = WeeklyStats {
      start_date: date(3),
      end_date: date(9),
      weight: WeightSpan {
        start: Some(dec!(81.2)),
        end: Some(dec!(80)),
        change: Some(dec!(-1.2)),
        change_pct: Some(dec!(-1.4778)),
      },
      avg_calories: Some(2100),
      logged_days: 3,
      target_calories: Some(2000),
      calorie_deficit: Some(-300),
      avg_water_ml: Some(1750),
      avg_sleep_hours: None,
      workouts_done: 3,
      workouts_planned: 4,
      streak_weeks: 2,
    };

    let text = weekly(&stats, Some("Keep <going>"));

    assert!(text.contains("(03.03 - 09.03)"));
    assert!(text.contains("81.2 → 80.0 kg (-1.2 kg, -1.5%)"));
    assert!(text.contains("Surplus: ~300 kcal"));
    assert!(text.contains("1.8 l/day"));
    assert!(!text.contains("Sleep"));
    assert!(text.contains("3 of 4 planned"));
    assert!(text.contains("Keep &lt;going&gt;"));
  }

  #[test]
  fn test_single_weigh_in_has_no_change() {
    let days = [DaySample {
      weight: Some(dec!(80)),
      ..DaySample::empty(date(9))
    }];
    let stats = aggregate::weekly_stats(&days, &[], None, date(9));

    let text = weekly(&stats, None);
    assert!(text.lines().any(|line| line == "⚖️ Weight: 80.0 → 80.0 kg"));
    assert!(!text.contains("0 kg,"));

    let zero_base = WeightSpan {
      start: Some(Decimal::ZERO),
      end: Some(dec!(1)),
      change: Some(dec!(1)),
      change_pct: None,
    };
    assert_eq!(
      weight_line(&zero_base).unwrap(),
      "⚖️ Weight: 0.0 → 1.0 kg (+1.0 kg)"
    );
  }

  #[test]
  fn test_alert_and_progress() {
    let text = alert(&Alert {
      kind: AlertKind::MissedWorkouts,
      message: "6 days without a workout.".into(),
      recommendation: "Plan",
    });
    assert!(text.starts_with("💪 <b>Missed workouts!</b>"));

    let samples = vec![
      crate::insight::LiftSample {
        date: date(1),
        exercise: "bench".into(),
        weight: dec!(60),
        e1rm: dec!(70),
      },
      crate::insight::LiftSample {
        date: date(5),
        exercise: "bench".into(),
        weight: dec!(65),
        e1rm: dec!(75.83),
      },
    ];
    let progress =
      aggregate::exercise_progress(&samples, "bench", 8).unwrap();
    let text = super::progress(&progress);
    assert!(text.contains("60 kg → 65 kg (+8.3%)"));
    assert!(text.contains("Steady growth"));
  }

  #[test]
  fn test_targets_sign() {
    let set = TargetSet {
      bmr: 1830,
      tdee: 2836,
      target_calories: 3119,
      protein_g: 170,
      fat_g: 76,
      carbs_g: 438,
      deficit_pct: dec!(-10),
    };
    assert!(targets(&set).contains("3119 kcal/day (+10%)"));
  }
}
