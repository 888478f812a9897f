use sea_orm_migration::prelude::*;

use super::m20260201_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Settings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Settings::TgUserId)
              .big_integer()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Settings::Timezone)
              .string()
              .not_null()
              .default("Asia/Yerevan"),
          )
          .col(
            ColumnDef::new(Settings::WeighDay)
              .string()
              .not_null()
              .default("sunday"),
          )
          .col(ColumnDef::new(Settings::WeighTime).time().not_null())
          .col(ColumnDef::new(Settings::DailySummaryTime).time().not_null())
          .col(ColumnDef::new(Settings::WeeklyReportTime).time().not_null())
          .col(
            ColumnDef::new(Settings::WeightLossPct)
              .decimal_len(4, 2)
              .not_null(),
          )
          .col(
            ColumnDef::new(Settings::LowCaloriesPct)
              .decimal_len(4, 2)
              .not_null(),
          )
          .col(
            ColumnDef::new(Settings::UseAiCoach)
              .boolean()
              .not_null()
              .default(true),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_settings_user")
              .from(Settings::Table, Settings::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Settings::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Settings {
  Table,
  TgUserId,
  Timezone,
  WeighDay,
  WeighTime,
  DailySummaryTime,
  WeeklyReportTime,
  WeightLossPct,
  LowCaloriesPct,
  UseAiCoach,
}
