pub use std::{collections::HashMap, sync::Arc, time::Duration};

pub use anyhow::Context;
pub use async_trait::async_trait;
pub use chrono::{
  Datelike, NaiveDate as Date, NaiveDateTime as DateTime, NaiveTime as Time,
  TimeDelta, Timelike, Utc,
};
pub use dashmap::DashMap;
pub use migration::{Migrator, MigratorTrait};
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait,
  QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
pub use tokio::time;
pub use tracing::{debug, error, info, warn};

pub use crate::error::{Error, Result};
pub(crate) use crate::utils;
