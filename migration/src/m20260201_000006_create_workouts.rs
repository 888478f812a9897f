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
          .table(Workouts::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Workouts::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Workouts::TgUserId).big_integer().not_null())
          .col(ColumnDef::new(Workouts::Date).date().not_null())
          .col(ColumnDef::new(Workouts::Kind).string().not_null())
          .col(ColumnDef::new(Workouts::DurationMin).integer().null())
          .col(ColumnDef::new(Workouts::CaloriesBurned).integer().null())
          .col(ColumnDef::new(Workouts::Note).text().null())
          .col(ColumnDef::new(Workouts::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_workouts_user")
              .from(Workouts::Table, Workouts::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_workouts_user_date")
          .table(Workouts::Table)
          .col(Workouts::TgUserId)
          .col(Workouts::Date)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Workouts::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Workouts {
  Table,
  Id,
  TgUserId,
  Date,
  Kind,
  DurationMin,
  CaloriesBurned,
  Note,
  CreatedAt,
}
