//! Per-user cadence configuration consumed by the scheduler

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub tg_user_id: i64,
  /// IANA zone name, e.g. `Europe/Berlin`
  pub timezone: String,
  /// Lowercase English weekday, shared by weigh-in and weekly report
  pub weigh_day: String,
  pub weigh_time: Time,
  pub daily_summary_time: Time,
  pub weekly_report_time: Time,
  pub weight_loss_pct: Decimal,
  pub low_calories_pct: Decimal,
  pub use_ai_coach: bool,
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
