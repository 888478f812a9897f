//! One row per user per calendar day, updated in place

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_records")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub tg_user_id: i64,
  pub date: Date,
  pub weight_kg: Option<Decimal>,
  pub calories: Option<i32>,
  pub water_ml: Option<i32>,
  pub sleep_hours: Option<Decimal>,
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
