pub use std::time::Duration;

pub use chrono::{Datelike, NaiveDateTime as DateTime, Utc};
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
pub use sea_orm_migration::MigratorTrait;
pub use tracing::{error, info, warn};

pub use crate::error::{Error, Result};
pub(crate) use crate::utils;
