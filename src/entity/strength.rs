//! Strength sets; `e1rm` is fixed at insert time

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "strength_records")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub tg_user_id: i64,
  pub date: Date,
  pub exercise: String,
  pub weight_kg: Decimal,
  pub reps: i32,
  pub sets: i32,
  pub e1rm: Decimal,
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
