use crate::prelude::*;

/// Fresh in-memory database with every migration applied
pub async fn setup_db() -> DatabaseConnection {
  let db = Database::connect("sqlite::memory:").await.unwrap();
  Migrator::up(&db, None).await.unwrap();
  db
}
