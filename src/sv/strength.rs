use crate::{
  entity::strength,
  insight::{LiftSample, calculator},
  prelude::*,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NewLift {
  pub exercise: String,
  pub weight_kg: Decimal,
  pub reps: i32,
  pub sets: i32,
}

/// Stored set together with the entry logged before it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Logged {
  pub record: strength::Model,
  pub previous: Option<strength::Model>,
}

/// Lowercased, inner whitespace collapsed to single `_`
pub fn normalize_exercise(name: &str) -> String {
  name.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

pub struct Strength<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Strength<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn add(
    &self,
    tg_user_id: i64,
    date: Date,
    lift: NewLift,
  ) -> Result<Logged> {
    let exercise = normalize_exercise(&lift.exercise);
    if exercise.is_empty() {
      return Err(Error::invalid("exercise name is empty"));
    }

    let previous = strength::Entity::find()
      .filter(strength::Column::TgUserId.eq(tg_user_id))
      .filter(strength::Column::Exercise.eq(exercise.as_str()))
      .order_by_desc(strength::Column::Date)
      .order_by_desc(strength::Column::Id)
      .one(self.db)
      .await?;

    let e1rm = calculator::compute_estimated_1rm(lift.weight_kg, lift.reps);
    let record = strength::ActiveModel {
      tg_user_id: Set(tg_user_id),
      date: Set(date),
      exercise: Set(exercise),
      weight_kg: Set(lift.weight_kg),
      reps: Set(lift.reps),
      sets: Set(lift.sets),
      e1rm: Set(e1rm),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    }
    .insert(self.db)
    .await?;

    Ok(Logged { record, previous })
  }

  /// Every set of one exercise, oldest first.
  pub async fn history(
    &self,
    tg_user_id: i64,
    exercise: &str,
  ) -> Result<Vec<LiftSample>> {
    let records = strength::Entity::find()
      .filter(strength::Column::TgUserId.eq(tg_user_id))
      .filter(strength::Column::Exercise.eq(normalize_exercise(exercise)))
      .order_by_asc(strength::Column::Date)
      .order_by_asc(strength::Column::Id)
      .all(self.db)
      .await?;
    Ok(records.iter().map(LiftSample::from).collect())
  }

  /// Distinct exercise names, most recently logged first.
  pub async fn exercises(
    &self,
    tg_user_id: i64,
    limit: usize,
  ) -> Result<Vec<String>> {
    let names: Vec<String> = strength::Entity::find()
      .select_only()
      .column(strength::Column::Exercise)
      .filter(strength::Column::TgUserId.eq(tg_user_id))
      .order_by_desc(strength::Column::Date)
      .order_by_desc(strength::Column::Id)
      .into_tuple()
      .all(self.db)
      .await?;

    let mut seen = Vec::new();
    for name in names {
      if !seen.contains(&name) {
        seen.push(name);
      }
      if seen.len() == limit {
        break;
      }
    }
    Ok(seen)
  }
}
