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
          .table(DailyRecords::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(DailyRecords::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(DailyRecords::TgUserId).big_integer().not_null())
          .col(ColumnDef::new(DailyRecords::Date).date().not_null())
          .col(ColumnDef::new(DailyRecords::WeightKg).decimal_len(5, 2).null())
          .col(ColumnDef::new(DailyRecords::Calories).integer().null())
          .col(ColumnDef::new(DailyRecords::WaterMl).integer().null())
          .col(ColumnDef::new(DailyRecords::SleepHours).decimal_len(3, 1).null())
          .col(ColumnDef::new(DailyRecords::Note).text().null())
          .col(ColumnDef::new(DailyRecords::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_daily_records_user")
              .from(DailyRecords::Table, DailyRecords::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("uq_daily_records_user_date")
          .table(DailyRecords::Table)
          .col(DailyRecords::TgUserId)
          .col(DailyRecords::Date)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(DailyRecords::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum DailyRecords {
  Table,
  Id,
  TgUserId,
  Date,
  WeightKg,
  Calories,
  WaterMl,
  SleepHours,
  Note,
  CreatedAt,
}
