use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  /// Telegram id, also the chat id messages are delivered to
  #[sea_orm(primary_key, auto_increment = false)]
  pub tg_user_id: i64,
  pub username: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_one = "super::profile::Entity")]
  Profile,
  #[sea_orm(has_one = "super::targets::Entity")]
  Targets,
  #[sea_orm(has_one = "super::settings::Entity")]
  Settings,
  #[sea_orm(has_many = "super::daily_record::Entity")]
  DailyRecords,
  #[sea_orm(has_many = "super::intake::Entity")]
  Intake,
  #[sea_orm(has_many = "super::workout::Entity")]
  Workouts,
  #[sea_orm(has_many = "super::strength::Entity")]
  Strength,
}

impl Related<super::profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<super::targets::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Targets.def()
  }
}

impl Related<super::settings::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Settings.def()
  }
}

impl Related<super::daily_record::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::DailyRecords.def()
  }
}

impl Related<super::intake::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Intake.def()
  }
}

impl Related<super::workout::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Workouts.def()
  }
}

impl Related<super::strength::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Strength.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
