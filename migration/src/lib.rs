pub use sea_orm_migration::prelude::*;

mod m20260201_000001_create_users;
mod m20260201_000002_create_profiles;
mod m20260201_000003_create_target_sets;
mod m20260201_000004_create_daily_records;
mod m20260201_000005_create_intake_entries;
mod m20260201_000006_create_workouts;
mod m20260201_000007_create_strength_records;
mod m20260201_000008_create_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260201_000001_create_users::Migration),
      Box::new(m20260201_000002_create_profiles::Migration),
      Box::new(m20260201_000003_create_target_sets::Migration),
      Box::new(m20260201_000004_create_daily_records::Migration),
      Box::new(m20260201_000005_create_intake_entries::Migration),
      Box::new(m20260201_000006_create_workouts::Migration),
      Box::new(m20260201_000007_create_strength_records::Migration),
      Box::new(m20260201_000008_create_settings::Migration),
    ]
  }
}
