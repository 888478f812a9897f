use sea_orm::{ConnectionTrait, sea_query::Expr};

use crate::{
  entity::{daily_record, intake},
  insight::alerts::WeightPoint,
  prelude::*,
};

/// Fields to write into a day's record. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyPatch {
  pub weight_kg: Option<Decimal>,
  pub calories: Option<i32>,
  pub water_ml: Option<i32>,
  pub sleep_hours: Option<Decimal>,
  pub note: Option<String>,
}

pub struct Daily<'a> {
  db: &'a DatabaseConnection,
}

async fn upsert_in<C: ConnectionTrait>(
  db: &C,
  tg_user_id: i64,
  date: Date,
  patch: DailyPatch,
) -> Result<daily_record::Model> {
  let existing = daily_record::Entity::find()
    .filter(daily_record::Column::TgUserId.eq(tg_user_id))
    .filter(daily_record::Column::Date.eq(date))
    .one(db)
    .await?;

  let mut model = match existing {
    Some(record) => daily_record::ActiveModel::from(record),
    None => daily_record::ActiveModel {
      tg_user_id: Set(tg_user_id),
      date: Set(date),
      weight_kg: Set(None),
      calories: Set(None),
      water_ml: Set(None),
      sleep_hours: Set(None),
      note: Set(None),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    },
  };
  let is_new = model.id.is_not_set();

  if let Some(weight) = patch.weight_kg {
    model.weight_kg = Set(Some(weight));
  }
  if let Some(calories) = patch.calories {
    model.calories = Set(Some(calories));
  }
  if let Some(water) = patch.water_ml {
    model.water_ml = Set(Some(water));
  }
  if let Some(hours) = patch.sleep_hours {
    model.sleep_hours = Set(Some(hours));
  }
  if let Some(note) = patch.note {
    model.note = Set(Some(note));
  }

  Ok(if is_new { model.insert(db).await? } else { model.update(db).await? })
}

impl<'a> Daily<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn upsert(
    &self,
    tg_user_id: i64,
    date: Date,
    patch: DailyPatch,
  ) -> Result<daily_record::Model> {
    upsert_in(self.db, tg_user_id, date, patch).await
  }

  pub async fn on(
    &self,
    tg_user_id: i64,
    date: Date,
  ) -> Result<Option<daily_record::Model>> {
    let record = daily_record::Entity::find()
      .filter(daily_record::Column::TgUserId.eq(tg_user_id))
      .filter(daily_record::Column::Date.eq(date))
      .one(self.db)
      .await?;
    Ok(record)
  }

  /// Records within `[start, end]`, oldest first.
  pub async fn between(
    &self,
    tg_user_id: i64,
    start: Date,
    end: Date,
  ) -> Result<Vec<daily_record::Model>> {
    let records = daily_record::Entity::find()
      .filter(daily_record::Column::TgUserId.eq(tg_user_id))
      .filter(daily_record::Column::Date.between(start, end))
      .order_by_asc(daily_record::Column::Date)
      .all(self.db)
      .await?;
    Ok(records)
  }

  /// Latest weight sample dated on or before `until`.
  pub async fn weight_at(
    &self,
    tg_user_id: i64,
    until: Date,
  ) -> Result<Option<WeightPoint>> {
    let record = daily_record::Entity::find()
      .filter(daily_record::Column::TgUserId.eq(tg_user_id))
      .filter(daily_record::Column::WeightKg.is_not_null())
      .filter(daily_record::Column::Date.lte(until))
      .order_by_desc(daily_record::Column::Date)
      .one(self.db)
      .await?;

    Ok(record.and_then(|record| {
      record.weight_kg.map(|weight| WeightPoint {
        date: record.date,
        weight: weight.round_dp(2).normalize(),
      })
    }))
  }

  /// Appends a meal and writes the day's new intake sum into the daily
  /// record. Returns that sum.
  pub async fn add_intake(
    &self,
    tg_user_id: i64,
    date: Date,
    calories: i32,
    description: Option<String>,
  ) -> Result<i32> {
    let txn = self.db.begin().await?;

    intake::ActiveModel {
      tg_user_id: Set(tg_user_id),
      date: Set(date),
      calories: Set(calories),
      description: Set(description),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    }
    .insert(&txn)
    .await?;

    let total = intake_sum(&txn, tg_user_id, date).await?;
    upsert_in(
      &txn,
      tg_user_id,
      date,
      DailyPatch { calories: Some(total), ..DailyPatch::default() },
    )
    .await?;

    txn.commit().await?;
    Ok(total)
  }

  pub async fn intake_total(&self, tg_user_id: i64, date: Date) -> Result<i32> {
    intake_sum(self.db, tg_user_id, date).await
  }
}

async fn intake_sum<C: ConnectionTrait>(
  db: &C,
  tg_user_id: i64,
  date: Date,
) -> Result<i32> {
  let total: Option<i64> = intake::Entity::find()
    .select_only()
    .column_as(Expr::col(intake::Column::Calories).sum(), "total")
    .filter(intake::Column::TgUserId.eq(tg_user_id))
    .filter(intake::Column::Date.eq(date))
    .into_tuple::<Option<i64>>()
    .one(db)
    .await?
    .flatten();

  Ok(total.unwrap_or(0).clamp(0, i32::MAX as i64) as i32)
}
