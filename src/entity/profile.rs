//! Body profile captured at onboarding, replaced wholesale on re-onboarding

use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Gender {
  #[sea_orm(string_value = "male")]
  Male,
  #[sea_orm(string_value = "female")]
  Female,
}

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ActivityLevel {
  #[sea_orm(string_value = "sedentary")]
  Sedentary,
  #[sea_orm(string_value = "light")]
  Light,
  #[sea_orm(string_value = "moderate")]
  Moderate,
  #[sea_orm(string_value = "high")]
  High,
  #[sea_orm(string_value = "very_high")]
  VeryHigh,
}

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Goal {
  #[sea_orm(string_value = "recomp")]
  Recomp,
  #[sea_orm(string_value = "cut")]
  Cut,
  #[sea_orm(string_value = "bulk")]
  Bulk,
}

#[derive(
  Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum,
  Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum GoalSpeed {
  #[sea_orm(string_value = "gentle")]
  Gentle,
  #[default]
  #[sea_orm(string_value = "standard")]
  Standard,
  #[sea_orm(string_value = "aggressive")]
  Aggressive,
}

impl FromStr for Gender {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "m" | "male" => Ok(Self::Male),
      "f" | "female" => Ok(Self::Female),
      _ => Err(()),
    }
  }
}

impl ActivityLevel {
  /// Unknown tier names fall back to the lowest tier.
  pub fn parse_lossy(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "light" => Self::Light,
      "moderate" => Self::Moderate,
      "high" => Self::High,
      "very_high" | "veryhigh" => Self::VeryHigh,
      _ => Self::Sedentary,
    }
  }
}

impl FromStr for Goal {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "recomp" => Ok(Self::Recomp),
      "cut" => Ok(Self::Cut),
      "bulk" => Ok(Self::Bulk),
      _ => Err(()),
    }
  }
}

impl FromStr for GoalSpeed {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "gentle" => Ok(Self::Gentle),
      "standard" => Ok(Self::Standard),
      "aggressive" => Ok(Self::Aggressive),
      _ => Err(()),
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub tg_user_id: i64,
  pub gender: Gender,
  pub age: i32,
  pub height_cm: i32,
  pub weight_kg: Decimal,
  pub activity: ActivityLevel,
  pub goal: Goal,
  pub goal_speed: GoalSpeed,
  pub updated_at: DateTime,
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
