//! Database migrations using SeaORM

use sea_orm_migration::prelude::*;

mod m20260815_000001_create_iq_codes;
mod m20260815_000002_create_one_time_codes;
mod m20260815_000003_create_plafond;
mod m20260815_000004_create_validation_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260815_000001_create_iq_codes::Migration),
      Box::new(m20260815_000002_create_one_time_codes::Migration),
      Box::new(m20260815_000003_create_plafond::Migration),
      Box::new(m20260815_000004_create_validation_requests::Migration),
    ]
  }
}
