use crate::{
  entity::{profile, targets},
  insight::{ProfileInput, TargetSet, calculator},
  prelude::*,
};

pub struct Profile<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Profile<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn targets(
    &self,
    tg_user_id: i64,
  ) -> Result<Option<targets::Model>> {
    Ok(targets::Entity::find_by_id(tg_user_id).one(self.db).await?)
  }

  /// Stores the profile and replaces the user's target set with a fresh
  /// computation.
  pub async fn save(
    &self,
    tg_user_id: i64,
    input: ProfileInput,
  ) -> Result<TargetSet> {
    let computed = calculator::compute_targets(&input);
    let now = Utc::now().naive_utc();

    let txn = self.db.begin().await?;

    let profile = profile::ActiveModel {
      tg_user_id: Set(tg_user_id),
      gender: Set(input.gender),
      age: Set(input.age),
      height_cm: Set(input.height_cm),
      weight_kg: Set(input.weight_kg),
      activity: Set(input.activity),
      goal: Set(input.goal),
      goal_speed: Set(input.goal_speed),
      updated_at: Set(now),
    };
    if profile::Entity::find_by_id(tg_user_id).one(&txn).await?.is_some() {
      profile.update(&txn).await?;
    } else {
      profile.insert(&txn).await?;
    }

    targets::Entity::delete_by_id(tg_user_id).exec(&txn).await?;
    targets::ActiveModel {
      tg_user_id: Set(tg_user_id),
      bmr: Set(computed.bmr),
      tdee: Set(computed.tdee),
      target_calories: Set(computed.target_calories),
      protein_g: Set(computed.protein_g),
      fat_g: Set(computed.fat_g),
      carbs_g: Set(computed.carbs_g),
      deficit_pct: Set(computed.deficit_pct),
      computed_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    debug!(
      user = tg_user_id,
      target = computed.target_calories,
      "Targets updated"
    );
    Ok(computed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{ActivityLevel, Gender, Goal, GoalSpeed},
    sv::{self, testing::setup_db},
  };

  fn input(goal: Goal) -> ProfileInput {
    ProfileInput {
      gender: Gender::Male,
      age: 30,
      height_cm: 180,
      weight_kg: dec!(85),
      activity: ActivityLevel::Moderate,
      goal,
      goal_speed: GoalSpeed::Standard,
    }
  }

  #[tokio::test]
  async fn test_save_replaces_targets() {
    let db = setup_db().await;
    sv::User::new(&db).get_or_create(9, None).await.unwrap();
    let sv = Profile::new(&db);

    assert!(sv.targets(9).await.unwrap().is_none());

    let cut = sv.save(9, input(Goal::Cut)).await.unwrap();
    assert_eq!(sv.targets(9).await.unwrap().unwrap().target_calories, 2410);

    let bulk = sv.save(9, input(Goal::Bulk)).await.unwrap();
    assert!(bulk.target_calories > cut.target_calories);

    let stored = sv.targets(9).await.unwrap().unwrap();
    assert_eq!(stored.target_calories, bulk.target_calories);
    let stored = profile::Entity::find_by_id(9).one(&db).await.unwrap();
    assert_eq!(stored.unwrap().goal, Goal::Bulk);
  }
}
