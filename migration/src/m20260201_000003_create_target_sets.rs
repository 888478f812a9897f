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
          .table(TargetSets::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(TargetSets::TgUserId)
              .big_integer()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(TargetSets::Bmr).integer().not_null())
          .col(ColumnDef::new(TargetSets::Tdee).integer().not_null())
          .col(ColumnDef::new(TargetSets::TargetCalories).integer().not_null())
          .col(ColumnDef::new(TargetSets::ProteinG).integer().not_null())
          .col(ColumnDef::new(TargetSets::FatG).integer().not_null())
          .col(ColumnDef::new(TargetSets::CarbsG).integer().not_null())
          .col(
            ColumnDef::new(TargetSets::DeficitPct).decimal_len(5, 2).not_null(),
          )
          .col(ColumnDef::new(TargetSets::ComputedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_target_sets_user")
              .from(TargetSets::Table, TargetSets::TgUserId)
              .to(Users::Table, Users::TgUserId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(TargetSets::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum TargetSets {
  Table,
  TgUserId,
  Bmr,
  Tdee,
  TargetCalories,
  ProteinG,
  FatG,
  CarbsG,
  DeficitPct,
  ComputedAt,
}
