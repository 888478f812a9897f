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
          .table(IntakeEntries::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(IntakeEntries::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(IntakeEntries::TgUserId).big_integer().not_null())
          .col(ColumnDef::new(IntakeEntries::Date).date().not_null())
          .col(ColumnDef::new(IntakeEntries::Calories).integer().not_null())
          .col(ColumnDef::new(IntakeEntries::Description).string().null())
          .col(ColumnDef::new(IntakeEntries::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_intake_entries_user")
              .from(IntakeEntries::Table, IntakeEntries::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_intake_entries_user_date")
          .table(IntakeEntries::Table)
          .col(IntakeEntries::TgUserId)
          .col(IntakeEntries::Date)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(IntakeEntries::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum IntakeEntries {
  Table,
  Id,
  TgUserId,
  Date,
  Calories,
  Description,
  CreatedAt,
}
