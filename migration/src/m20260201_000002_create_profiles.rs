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
          .table(Profiles::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Profiles::TgUserId)
              .big_integer()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(Profiles::Gender).string().not_null())
          .col(ColumnDef::new(Profiles::Age).integer().not_null())
          .col(ColumnDef::new(Profiles::HeightCm).integer().not_null())
          .col(ColumnDef::new(Profiles::WeightKg).decimal_len(5, 2).not_null())
          .col(ColumnDef::new(Profiles::Activity).string().not_null())
          .col(ColumnDef::new(Profiles::Goal).string().not_null())
          .col(
            ColumnDef::new(Profiles::GoalSpeed)
              .string()
              .not_null()
              .default("standard"),
          )
          .col(ColumnDef::new(Profiles::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_profiles_user")
              .from(Profiles::Table, Profiles::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Profiles {
  Table,
  TgUserId,
  Gender,
  Age,
  HeightCm,
  WeightKg,
  Activity,
  Goal,
  GoalSpeed,
  UpdatedAt,
}
