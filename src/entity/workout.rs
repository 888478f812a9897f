use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workouts")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub tg_user_id: i64,
  pub date: Date,
  /// Free-form type tag, e.g. `gym`, `cardio`
  pub kind: String,
  pub duration_min: Option<i32>,
  pub calories_burned: Option<i32>,
  pub note: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::TgUserId",
    to = "super::user::Column::TgUserId"
  )]
  User,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
