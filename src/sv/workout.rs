use sea_orm::sea_query::Expr;

use crate::{entity::workout, prelude::*};

pub const KINDS: [&str; 4] = ["gym", "cardio", "walking", "other"];

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
  pub kind: String,
  pub duration_min: Option<i32>,
  pub calories_burned: Option<i32>,
  pub note: Option<String>,
}

/// Totals for one calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayWorkouts {
  pub count: usize,
  pub calories_burned: i32,
}

pub struct Workout<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Workout<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn add(
    &self,
    tg_user_id: i64,
    date: Date,
    new: NewWorkout,
  ) -> Result<workout::Model> {
    let workout = workout::ActiveModel {
      tg_user_id: Set(tg_user_id),
      date: Set(date),
      kind: Set(new.kind),
      duration_min: Set(new.duration_min),
      calories_burned: Set(new.calories_burned),
      note: Set(new.note),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    }
    .insert(self.db)
    .await?;

    debug!(user = tg_user_id, kind = %workout.kind, "Workout logged");
    Ok(workout)
  }

  /// Workout dates within `[start, end]`, one entry per workout.
  pub async fn dates(
    &self,
    tg_user_id: i64,
    start: Date,
    end: Date,
  ) -> Result<Vec<Date>> {
    let dates = workout::Entity::find()
      .select_only()
      .column(workout::Column::Date)
      .filter(workout::Column::TgUserId.eq(tg_user_id))
      .filter(workout::Column::Date.between(start, end))
      .order_by_asc(workout::Column::Date)
      .into_tuple::<Date>()
      .all(self.db)
      .await?;
    Ok(dates)
  }

  pub async fn last_date(
    &self,
    tg_user_id: i64,
    until: Date,
  ) -> Result<Option<Date>> {
    let date = workout::Entity::find()
      .select_only()
      .column(workout::Column::Date)
      .filter(workout::Column::TgUserId.eq(tg_user_id))
      .filter(workout::Column::Date.lte(until))
      .order_by_desc(workout::Column::Date)
      .into_tuple::<Date>()
      .one(self.db)
      .await?;
    Ok(date)
  }

  pub async fn on(&self, tg_user_id: i64, date: Date) -> Result<DayWorkouts> {
    let row: Option<(i64, Option<i64>)> = workout::Entity::find()
      .select_only()
      .column_as(Expr::col(workout::Column::Id).count(), "count")
      .column_as(Expr::col(workout::Column::CaloriesBurned).sum(), "burned")
      .filter(workout::Column::TgUserId.eq(tg_user_id))
      .filter(workout::Column::Date.eq(date))
      .into_tuple()
      .one(self.db)
      .await?;

    let (count, burned) = row.unwrap_or_default();
    Ok(DayWorkouts {
      count: count.max(0) as usize,
      calories_burned: burned.unwrap_or(0).clamp(0, i32::MAX as i64) as i32,
    })
  }

  /// Workouts from Monday of `today`'s week up to `today`.
  pub async fn count_this_week(
    &self,
    tg_user_id: i64,
    today: Date,
  ) -> Result<usize> {
    let monday =
      today - TimeDelta::days(today.weekday().num_days_from_monday() as i64);
    Ok(self.dates(tg_user_id, monday, today).await?.len())
  }
}
