use tracing::info;

use crate::{migration::Migrator, prelude::*, services};

#[derive(Debug, Clone, Copy)]
pub struct Config {
  /// Monthly discount cap per tourist, in euros.
  pub plafond_cap: Decimal,
  /// Use counter granted when a validation request is accepted.
  pub request_uses: i32,
  /// Regeneration attempts before issuance gives up on collisions.
  pub issue_attempts: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self { plafond_cap: dec!(150.00), request_uses: 10, issue_attempts: 8 }
  }
}

pub struct Services<'a> {
  pub iqcodes: services::IqCodes<'a>,
  pub codes: services::Codes<'a>,
  pub ledger: services::Ledger<'a>,
  pub discounts: services::Discounts<'a>,
  pub requests: services::Requests<'a>,
  pub reports: services::Reports<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str) -> Self {
    Self::with_config(db_url, Config::default()).await
  }

  pub async fn with_config(db_url: &str, config: Config) -> Self {
    info!("Connecting to database...");
    let db =
      Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, config }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      iqcodes: services::IqCodes::new(&self.db),
      codes: services::Codes::new(&self.db, self.config),
      ledger: services::Ledger::new(&self.db, self.config),
      discounts: services::Discounts::new(&self.db, self.config),
      requests: services::Requests::new(&self.db, self.config),
      reports: services::Reports::new(&self.db),
    }
  }
}
