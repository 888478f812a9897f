//! Loads history out of storage and hands it to the pure aggregates

use crate::{
  channel::{ChartRenderer, Coach},
  insight::{
    AlertContext, DailySummary, DaySample, ExerciseProgress, MonthlyStats,
    Thresholds, WeeklyStats, WeightTrend,
    aggregate::{self, PROGRESS_WEEKS, STREAK_LOOKBACK_WEEKS},
    report,
  },
  prelude::*,
  sv,
};

/// Days covered by the chart attached to the weekly report
pub const WEEKLY_CHART_DAYS: i64 = 14;
pub const WEEKLY_CHART_CAPTION: &str = "⚖️ Weight, last 14 days";

/// Rendered weekly report, the chart goes out before the text
#[derive(Debug)]
pub struct WeeklyReport {
  pub text: String,
  pub chart: Option<Vec<u8>>,
}

pub struct Insight<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Insight<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  async fn days(
    &self,
    tg_user_id: i64,
    start: Date,
    end: Date,
  ) -> Result<Vec<DaySample>> {
    let records =
      sv::Daily::new(self.db).between(tg_user_id, start, end).await?;
    Ok(records.iter().map(DaySample::from).collect())
  }

  async fn target_calories(&self, tg_user_id: i64) -> Result<Option<i32>> {
    let targets = sv::Profile::new(self.db).targets(tg_user_id).await?;
    Ok(targets.map(|targets| targets.target_calories))
  }

  async fn streak_window(
    &self,
    tg_user_id: i64,
    end: Date,
  ) -> Result<Vec<Date>> {
    let start = end - TimeDelta::weeks(STREAK_LOOKBACK_WEEKS);
    sv::Workout::new(self.db).dates(tg_user_id, start, end).await
  }

  pub async fn daily(
    &self,
    tg_user_id: i64,
    date: Date,
  ) -> Result<DailySummary> {
    let eaten = sv::Daily::new(self.db).intake_total(tg_user_id, date).await?;
    let workouts = sv::Workout::new(self.db).on(tg_user_id, date).await?;
    let record = sv::Daily::new(self.db)
      .on(tg_user_id, date)
      .await?
      .map(|record| DaySample::from(&record));
    let target = self.target_calories(tg_user_id).await?;

    // a day logged only through the record carries its own total
    let eaten = if eaten > 0 {
      eaten
    } else {
      record.as_ref().and_then(|day| day.calories).unwrap_or(0)
    };

    Ok(aggregate::daily_summary(
      date,
      eaten,
      workouts.calories_burned,
      workouts.count,
      record.as_ref(),
      target,
    ))
  }

  pub async fn weekly(
    &self,
    tg_user_id: i64,
    end: Date,
  ) -> Result<WeeklyStats> {
    let days = self.days(tg_user_id, end - TimeDelta::days(6), end).await?;
    let workouts = self.streak_window(tg_user_id, end).await?;
    let target = self.target_calories(tg_user_id).await?;
    Ok(aggregate::weekly_stats(&days, &workouts, target, end))
  }

  /// Weekly stats rendered with an optional coach comment and weight chart.
  /// Neither extra can fail the report, their errors are only logged.
  pub async fn weekly_report(
    &self,
    tg_user_id: i64,
    end: Date,
    coach: Option<&dyn Coach>,
    charts: Option<&dyn ChartRenderer>,
  ) -> Result<WeeklyReport> {
    let stats = self.weekly(tg_user_id, end).await?;

    let comment = match coach {
      Some(coach) => coach.comment(&stats).await,
      None => None,
    };

    let chart = match charts {
      Some(charts) => self.weekly_chart(tg_user_id, end, charts).await,
      None => None,
    };

    Ok(WeeklyReport {
      text: report::weekly(&stats, comment.as_deref()),
      chart,
    })
  }

  async fn weekly_chart(
    &self,
    tg_user_id: i64,
    end: Date,
    charts: &dyn ChartRenderer,
  ) -> Option<Vec<u8>> {
    let chart = async {
      let trend = self.trend(tg_user_id, end, WEEKLY_CHART_DAYS).await?;
      if !trend.has_trend() {
        return Ok(None);
      }
      charts.weight_chart(&trend).map(Some)
    };
    match chart.await {
      Ok(png) => png,
      Err(err) => {
        warn!(user = tg_user_id, "Weekly chart skipped: {err}");
        None
      }
    }
  }

  pub async fn monthly(
    &self,
    tg_user_id: i64,
    end: Date,
  ) -> Result<MonthlyStats> {
    let start = end - TimeDelta::days(29);
    let days = self.days(tg_user_id, start, end).await?;
    let workouts =
      sv::Workout::new(self.db).dates(tg_user_id, start, end).await?;
    Ok(aggregate::monthly_stats(&days, &workouts, end))
  }

  pub async fn trend(
    &self,
    tg_user_id: i64,
    end: Date,
    span_days: i64,
  ) -> Result<WeightTrend> {
    let start = end - TimeDelta::days(span_days.max(0));
    let days = self.days(tg_user_id, start, end).await?;
    Ok(aggregate::weight_trend(&days, end, span_days))
  }

  pub async fn progress(
    &self,
    tg_user_id: i64,
    exercise: &str,
  ) -> Result<Option<ExerciseProgress>> {
    let name = sv::strength::normalize_exercise(exercise);
    let lifts = sv::Strength::new(self.db).history(tg_user_id, &name).await?;
    Ok(aggregate::exercise_progress(&lifts, &name, PROGRESS_WEEKS))
  }

  pub async fn streak(&self, tg_user_id: i64, today: Date) -> Result<u32> {
    let workouts = self.streak_window(tg_user_id, today).await?;
    Ok(aggregate::workout_streak(&workouts, today))
  }

  /// Context for the alert rules, thresholds taken from the user's settings.
  pub async fn alert_context(
    &self,
    tg_user_id: i64,
    today: Date,
  ) -> Result<AlertContext> {
    let settings = sv::Settings::new(self.db).get(tg_user_id).await?;
    let thresholds = Thresholds {
      weight_loss_pct: settings.weight_loss_pct.round_dp(2),
      low_calories_ratio: settings.low_calories_pct.round_dp(2),
    };

    let daily = sv::Daily::new(self.db);
    let latest_weight = daily.weight_at(tg_user_id, today).await?;
    let week_ago_weight =
      daily.weight_at(tg_user_id, today - TimeDelta::days(7)).await?;
    let recent_days =
      self.days(tg_user_id, today - TimeDelta::days(2), today).await?;
    let last_workout =
      sv::Workout::new(self.db).last_date(tg_user_id, today).await?;

    Ok(AlertContext {
      today,
      latest_weight,
      week_ago_weight,
      recent_days,
      last_workout,
      target_calories: self.target_calories(tg_user_id).await?,
      thresholds,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{ActivityLevel, Gender, Goal, GoalSpeed},
    channel::testing::{FakeCharts, StaticCoach},
    insight::{
      ProfileInput,
      alerts::{self, AlertKind},
    },
    sv::{DailyPatch, NewLift, NewWorkout, testing::setup_db},
  };

  fn date(day: u32) -> Date {
    Date::from_ymd_opt(2026, 3, day).unwrap()
  }

  async fn user_with_targets(db: &DatabaseConnection, id: i64) -> i32 {
    sv::User::new(db).get_or_create(id, None).await.unwrap();
    let input = ProfileInput {
      gender: Gender::Female,
      age: 28,
      height_cm: 168,
      weight_kg: dec!(64),
      activity: ActivityLevel::Light,
      goal: Goal::Cut,
      goal_speed: GoalSpeed::Standard,
    };
    sv::Profile::new(db).save(id, input).await.unwrap().target_calories
  }

  fn weight(kg: Decimal) -> DailyPatch {
    DailyPatch { weight_kg: Some(kg), ..DailyPatch::default() }
  }

  #[tokio::test]
  async fn test_daily_summary_from_storage() {
    let db = setup_db().await;
    let target = user_with_targets(&db, 1).await;
    let daily = sv::Daily::new(&db);

    daily.add_intake(1, date(10), 900, None).await.unwrap();
    daily.add_intake(1, date(10), 700, None).await.unwrap();
    daily
      .upsert(
        1,
        date(10),
        DailyPatch { water_ml: Some(2100), ..DailyPatch::default() },
      )
      .await
      .unwrap();
    sv::Workout::new(&db)
      .add(
        1,
        date(10),
        NewWorkout {
          kind: "cardio".into(),
          duration_min: Some(40),
          calories_burned: Some(350),
          note: None,
        },
      )
      .await
      .unwrap();

    let summary = Insight::new(&db).daily(1, date(10)).await.unwrap();
    assert_eq!(summary.calories_eaten, 1600);
    assert_eq!(summary.calories_burned, 350);
    assert_eq!(summary.calories_net, 1250);
    assert_eq!(summary.target_calories, Some(target));
    assert_eq!(summary.water_ml, Some(2100));
    assert_eq!(summary.workouts, 1);
  }

  #[tokio::test]
  async fn test_weekly_and_trend() {
    let db = setup_db().await;
    user_with_targets(&db, 2).await;
    let daily = sv::Daily::new(&db);

    daily.upsert(2, date(2), weight(dec!(70.0))).await.unwrap();
    daily.upsert(2, date(5), weight(dec!(69.6))).await.unwrap();
    daily.upsert(2, date(8), weight(dec!(69.2))).await.unwrap();
    daily.add_intake(2, date(8), 1500, None).await.unwrap();

    let insight = Insight::new(&db);
    let week = insight.weekly(2, date(8)).await.unwrap();
    assert_eq!(week.weight.start, Some(dec!(70)));
    assert_eq!(week.weight.end, Some(dec!(69.2)));
    assert_eq!(week.weight.change, Some(dec!(-0.8)));
    assert_eq!(week.avg_calories, Some(1500));
    assert_eq!(week.logged_days, 1);

    let trend = insight.trend(2, date(8), 30).await.unwrap();
    assert_eq!(trend.points.len(), 3);
    assert_eq!(trend.points[2].moving_average, dec!(69.6));
  }

  #[tokio::test]
  async fn test_alert_context_uses_settings() {
    let db = setup_db().await;
    user_with_targets(&db, 3).await;
    let daily = sv::Daily::new(&db);

    daily.upsert(3, date(1), weight(dec!(80))).await.unwrap();
    daily.upsert(3, date(8), weight(dec!(79))).await.unwrap();

    let insight = Insight::new(&db);
    let ctx = insight.alert_context(3, date(8)).await.unwrap();
    assert_eq!(ctx.latest_weight.map(|w| w.weight), Some(dec!(79)));
    assert_eq!(ctx.week_ago_weight.map(|w| w.date), Some(date(1)));
    // 1.25% against the default 1% threshold
    let kinds: Vec<_> = alerts::evaluate(&ctx).iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [AlertKind::RapidWeightLoss]);

    sv::Settings::new(&db)
      .update(3, sv::SettingsPatch::parse("weight_loss_pct", "1.5").unwrap())
      .await
      .unwrap();
    let ctx = insight.alert_context(3, date(8)).await.unwrap();
    assert!(alerts::evaluate(&ctx).is_empty());
  }

  #[tokio::test]
  async fn test_progress_and_streak() {
    let db = setup_db().await;
    sv::User::new(&db).get_or_create(4, None).await.unwrap();
    let strength = sv::Strength::new(&db);
    for (day, kg) in [(2, dec!(60)), (9, dec!(65))] {
      strength
        .add(
          4,
          date(day),
          NewLift {
            exercise: "Bench Press".into(),
            weight_kg: kg,
            reps: 5,
            sets: 3,
          },
        )
        .await
        .unwrap();
    }

    let insight = Insight::new(&db);
    let progress = insight.progress(4, "bench press").await.unwrap().unwrap();
    assert_eq!(progress.max_weight, dec!(65));
    assert!(progress.has_trend());
    assert!(insight.progress(4, "curl").await.unwrap().is_none());

    let workouts = sv::Workout::new(&db);
    for day in [3, 10] {
      let kind = NewWorkout {
        kind: "gym".into(),
        duration_min: None,
        calories_burned: None,
        note: None,
      };
      workouts.add(4, date(day), kind).await.unwrap();
    }
    assert_eq!(insight.streak(4, date(11)).await.unwrap(), 2);
  }

  #[tokio::test]
  async fn test_weekly_report_extras() {
    let db = setup_db().await;
    user_with_targets(&db, 5).await;
    let daily = sv::Daily::new(&db);
    daily.upsert(5, date(8), weight(dec!(70))).await.unwrap();

    let insight = Insight::new(&db);
    let coach: &dyn Coach = &StaticCoach(Some("Solid week".into()));
    let charts: &dyn ChartRenderer = &FakeCharts { fail: false };

    // a single weight sample is not a trend
    let week = insight
      .weekly_report(5, date(8), Some(coach), Some(charts))
      .await
      .unwrap();
    assert!(week.text.contains("Solid week"));
    assert!(week.chart.is_none());

    daily.upsert(5, date(4), weight(dec!(70.6))).await.unwrap();
    let week = insight
      .weekly_report(5, date(8), None, Some(charts))
      .await
      .unwrap();
    assert!(!week.text.contains("Coach says"));
    assert!(week.chart.is_some());

    let broken: &dyn ChartRenderer = &FakeCharts { fail: true };
    let week = insight
      .weekly_report(5, date(8), Some(coach), Some(broken))
      .await
      .unwrap();
    assert!(week.chart.is_none());
    assert!(week.text.contains("Weekly report"));
  }
}
