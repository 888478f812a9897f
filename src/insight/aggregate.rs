//! Weekly, monthly, trend and strength aggregates

use super::{DaySample, LiftSample, percent_of};
use crate::prelude::*;

pub const MOVING_AVERAGE_WINDOW: usize = 7;
pub const STREAK_LOOKBACK_WEEKS: i64 = 52;
pub const PROGRESS_WEEKS: usize = 8;
pub const SAMPLES_PER_WEEK: usize = 3;
pub const PLANNED_WORKOUTS: usize = 4;
const MONTH_BUCKETS: i64 = 4;

/// First and last weight of a window and the change between them
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightSpan {
  pub start: Option<Decimal>,
  pub end: Option<Decimal>,
  pub change: Option<Decimal>,
  pub change_pct: Option<Decimal>,
}

impl WeightSpan {
  fn of<'a>(window: impl IntoIterator<Item = &'a DaySample>) -> Self {
    let weights: Vec<Decimal> =
      window.into_iter().filter_map(|day| day.weight).collect();

    let (Some(&start), Some(&end)) = (weights.first(), weights.last()) else {
      return Self::default();
    };
    if weights.len() < 2 {
      return Self { start: Some(start), end: Some(end), ..Self::default() };
    }

    let change = end - start;
    Self {
      start: Some(start),
      end: Some(end),
      change: Some(change),
      change_pct: percent_of(change, start),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyStats {
  pub start_date: Date,
  pub end_date: Date,
  pub weight: WeightSpan,
  pub avg_calories: Option<i32>,
  pub logged_days: usize,
  pub target_calories: Option<i32>,
  /// `(target - average) * logged days`, negative for a surplus
  pub calorie_deficit: Option<i32>,
  pub avg_water_ml: Option<i32>,
  pub avg_sleep_hours: Option<Decimal>,
  pub workouts_done: usize,
  pub workouts_planned: usize,
  pub streak_weeks: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStats {
  pub start_date: Date,
  pub end_date: Date,
  pub weight: WeightSpan,
  pub avg_calories: Option<i32>,
  pub total_workouts: usize,
  pub weeks_with_data: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
  pub date: Date,
  pub weight: Decimal,
  pub moving_average: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTrend {
  pub points: Vec<TrendPoint>,
}

impl WeightTrend {
  pub fn has_trend(&self) -> bool {
    self.points.len() >= 2
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProgress {
  pub exercise: String,
  /// Oldest first
  pub samples: Vec<LiftSample>,
  pub initial_weight: Decimal,
  pub max_weight: Decimal,
  pub initial_e1rm: Decimal,
  pub max_e1rm: Decimal,
  pub weight_change_pct: Option<Decimal>,
  pub e1rm_change_pct: Option<Decimal>,
}

impl ExerciseProgress {
  pub fn has_trend(&self) -> bool {
    self.samples.len() >= 2
  }
}

fn window(days: &[DaySample], start: Date, end: Date) -> Vec<&DaySample> {
  let mut window: Vec<_> =
    days.iter().filter(|day| day.date >= start && day.date <= end).collect();
  window.sort_by_key(|day| day.date);
  window
}

fn mean_i32(values: impl Iterator<Item = i32>) -> Option<i32> {
  let (sum, count) =
    values.fold((0i64, 0i64), |(sum, count), v| (sum + v as i64, count + 1));
  (count > 0).then(|| (sum / count) as i32)
}

fn mean_decimal(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
  let (sum, count) = values
    .fold((Decimal::ZERO, 0u32), |(sum, count), v| (sum + v, count + 1));
  (count > 0).then(|| sum / Decimal::from(count))
}

/// Aggregates the seven days ending at `end` inclusive.
pub fn weekly_stats(
  days: &[DaySample],
  workouts: &[Date],
  target_calories: Option<i32>,
  end: Date,
) -> WeeklyStats {
  let start = end - TimeDelta::days(6);
  let window = window(days, start, end);

  let logged_days = window.iter().filter(|day| day.calories.is_some()).count();
  let avg_calories = mean_i32(window.iter().filter_map(|day| day.calories));
  let calorie_deficit = match (avg_calories, target_calories) {
    (Some(avg), Some(target)) => Some((target - avg) * logged_days as i32),
    _ => None,
  };

  WeeklyStats {
    start_date: start,
    end_date: end,
    weight: WeightSpan::of(window.iter().copied()),
    avg_calories,
    logged_days,
    target_calories,
    calorie_deficit,
    avg_water_ml: mean_i32(window.iter().filter_map(|day| day.water_ml)),
    avg_sleep_hours: mean_decimal(
      window.iter().filter_map(|day| day.sleep_hours),
    ),
    workouts_done: workouts
      .iter()
      .filter(|date| **date >= start && **date <= end)
      .count(),
    workouts_planned: PLANNED_WORKOUTS,
    streak_weeks: workout_streak(workouts, end),
  }
}

/// Aggregates the 30 days ending at `end`. `weeks_with_data` counts the four
/// 7-day buckets from the range start holding a weight sample.
pub fn monthly_stats(
  days: &[DaySample],
  workouts: &[Date],
  end: Date,
) -> MonthlyStats {
  let start = end - TimeDelta::days(29);
  let window = window(days, start, end);

  let weeks_with_data = (0..MONTH_BUCKETS)
    .filter(|bucket| {
      let from = start + TimeDelta::days(bucket * 7);
      let to = from + TimeDelta::days(6);
      window.iter().any(|day| {
        day.weight.is_some() && day.date >= from && day.date <= to
      })
    })
    .count();

  MonthlyStats {
    start_date: start,
    end_date: end,
    weight: WeightSpan::of(window.iter().copied()),
    avg_calories: mean_i32(window.iter().filter_map(|day| day.calories)),
    total_workouts: workouts
      .iter()
      .filter(|date| **date >= start && **date <= end)
      .count(),
    weeks_with_data,
  }
}

/// Weight samples within `[end - span_days, end]` with a trailing moving
/// average over at most seven samples.
pub fn weight_trend(
  days: &[DaySample],
  end: Date,
  span_days: i64,
) -> WeightTrend {
  let start = end - TimeDelta::days(span_days.max(0));
  let samples: Vec<(Date, Decimal)> = window(days, start, end)
    .into_iter()
    .filter_map(|day| day.weight.map(|weight| (day.date, weight)))
    .collect();

  let points = samples
    .iter()
    .enumerate()
    .map(|(idx, &(date, weight))| {
      let from = (idx + 1).saturating_sub(MOVING_AVERAGE_WINDOW);
      let moving_average =
        mean_decimal(samples[from..=idx].iter().map(|&(_, w)| w))
          .unwrap_or(weight);
      TrendPoint { date, weight, moving_average }
    })
    .collect();

  WeightTrend { points }
}

/// Progress over the latest `weeks * 3` sets of one exercise.
pub fn exercise_progress(
  lifts: &[LiftSample],
  exercise: &str,
  weeks: usize,
) -> Option<ExerciseProgress> {
  let mut samples: Vec<&LiftSample> =
    lifts.iter().filter(|lift| lift.exercise == exercise).collect();
  // stable, so same-day sets keep their logging order
  samples.sort_by_key(|lift| lift.date);

  let keep = weeks * SAMPLES_PER_WEEK;
  let skip = samples.len().saturating_sub(keep);
  let samples: Vec<LiftSample> =
    samples.into_iter().skip(skip).cloned().collect();

  let first = samples.first()?;
  let initial_weight = first.weight;
  let initial_e1rm = first.e1rm;
  let max_weight = samples.iter().map(|s| s.weight).max()?;
  let max_e1rm = samples.iter().map(|s| s.e1rm).max()?;

  let (weight_change_pct, e1rm_change_pct) = if samples.len() >= 2 {
    (
      percent_of(max_weight - initial_weight, initial_weight),
      percent_of(max_e1rm - initial_e1rm, initial_e1rm),
    )
  } else {
    (None, None)
  };

  Some(ExerciseProgress {
    exercise: exercise.to_string(),
    samples,
    initial_weight,
    max_weight,
    initial_e1rm,
    max_e1rm,
    weight_change_pct,
    e1rm_change_pct,
  })
}

/// Consecutive Monday-aligned weeks with at least one workout, counting back
/// from the week containing `today`.
pub fn workout_streak(workouts: &[Date], today: Date) -> u32 {
  let monday =
    today - TimeDelta::days(today.weekday().num_days_from_monday() as i64);

  let mut streak = 0;
  for week in 0..STREAK_LOOKBACK_WEEKS {
    let start = monday - TimeDelta::weeks(week);
    let end = start + TimeDelta::days(6);
    if !workouts.iter().any(|date| *date >= start && *date <= end) {
      break;
    }
    streak += 1;
  }
  streak
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
  pub date: Date,
  pub calories_eaten: i32,
  pub calories_burned: i32,
  pub calories_net: i32,
  pub target_calories: Option<i32>,
  /// `net - target`
  pub delta: Option<i32>,
  pub percent_of_target: Option<i32>,
  pub workouts: usize,
  pub water_ml: Option<i32>,
  pub sleep_hours: Option<Decimal>,
}

pub fn daily_summary(
  date: Date,
  calories_eaten: i32,
  calories_burned: i32,
  workouts: usize,
  record: Option<&DaySample>,
  target_calories: Option<i32>,
) -> DailySummary {
  let calories_net = calories_eaten - calories_burned;
  let target_calories = target_calories.filter(|target| *target > 0);

  let delta = target_calories.map(|target| calories_net - target);
  let percent_of_target = target_calories
    .map(|target| (calories_net as i64 * 100 / target as i64) as i32);

  DailySummary {
    date,
    calories_eaten,
    calories_burned,
    calories_net,
    target_calories,
    delta,
    percent_of_target,
    workouts,
    water_ml: record.and_then(|day| day.water_ml),
    sleep_hours: record.and_then(|day| day.sleep_hours),
  }
}

impl DailySummary {
  /// Whether anything was eaten or trained on that day
  pub fn has_activity(&self) -> bool {
    self.calories_eaten > 0 || self.workouts > 0
  }

  pub fn recommendation(&self) -> Option<String> {
    let (target, delta) = (self.target_calories?, self.delta?);

    if self.calories_eaten == 0 {
      return Some(
        "You haven't logged any calories today. \
         Don't forget to add your meals!"
          .into(),
      );
    }

    let text = if delta < -500 {
      let pct = Decimal::from(delta.abs() * 100) / Decimal::from(target);
      format!(
        "The deficit is quite large ({} kcal, -{}%)! Add a snack or \
         something filling. A big deficit gets in the way of recovery.",
        delta.abs(),
        utils::decimal(pct, 0)
      )
    } else if delta < -200 {
      "A small deficit is fine for fat loss. \
       If you feel hungry, add a protein snack."
        .into()
    } else if delta < 0 {
      "Practically on plan! Keep it up.".into()
    } else if delta < 200 {
      "Slightly above plan but within the norm. Nothing to worry about.".into()
    } else if delta < 500 {
      "A surplus of about 200-500 kcal. If it wasn't planned, \
       watch your portions tomorrow."
        .into()
    } else {
      format!(
        "A surplus of {delta} kcal is a bit much. Don't beat yourself up, \
         just get back on plan tomorrow."
      )
    };
    Some(text)
  }

  pub fn tomorrow_tip(&self) -> Option<&'static str> {
    self.target_calories?;
    if self.calories_eaten == 0 {
      return Some(
        "Tomorrow: log calories as you go, it is easier to stay in control.",
      );
    }

    let delta = self.delta?;
    Some(if delta < -300 {
      "Tomorrow: try to get closer to the plan. \
       A constant deficit slows the metabolism down."
    } else if delta > 300 {
      "Tomorrow: focus on protein and vegetables, \
       they keep you full without extra calories."
    } else {
      "Tomorrow: keep it up!"
    })
  }
}
