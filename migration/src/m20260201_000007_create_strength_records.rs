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
          .table(StrengthRecords::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(StrengthRecords::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(StrengthRecords::TgUserId).big_integer().not_null(),
          )
          .col(ColumnDef::new(StrengthRecords::Date).date().not_null())
          .col(ColumnDef::new(StrengthRecords::Exercise).string().not_null())
          .col(
            ColumnDef::new(StrengthRecords::WeightKg)
              .decimal_len(6, 2)
              .not_null(),
          )
          .col(ColumnDef::new(StrengthRecords::Reps).integer().not_null())
          .col(ColumnDef::new(StrengthRecords::Sets).integer().not_null())
          .col(
            ColumnDef::new(StrengthRecords::E1rm).decimal_len(6, 2).not_null(),
          )
          .col(ColumnDef::new(StrengthRecords::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_strength_records_user")
              .from(StrengthRecords::Table, StrengthRecords::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_strength_records_user_exercise")
          .table(StrengthRecords::Table)
          .col(StrengthRecords::TgUserId)
          .col(StrengthRecords::Exercise)
          .col(StrengthRecords::Date)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(StrengthRecords::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum StrengthRecords {
  Table,
  Id,
  TgUserId,
  Date,
  Exercise,
  WeightKg,
  Reps,
  Sets,
  E1rm,
  CreatedAt,
}
