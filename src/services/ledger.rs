//! Plafond ledger - the per-tourist monthly spending cap
//!
//! The counter row is the authoritative total. It is only ever moved by
//! [`Ledger::charge`], which the discount application service calls inside
//! the same transaction as the code-store write, so the cap check and the
//! increment are one atomic conditional UPDATE rather than check-then-act.

use sea_orm::sea_query::{Expr, OnConflict};
use serde::Serialize;

use crate::{entities::plafond, prelude::*, state::Config};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSummary {
  pub total_used: Decimal,
  pub remaining: Decimal,
}

pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
  cap: Decimal,
}

impl<'a> Ledger<'a> {
  pub fn new(db: &'a DatabaseConnection, config: Config) -> Self {
    Self { db, cap: config.plafond_cap }
  }

  fn summary(&self, total_used: Decimal) -> UsageSummary {
    let remaining = (self.cap - total_used).max(Decimal::ZERO);
    UsageSummary { total_used, remaining }
  }

  /// Usage for an explicit period. A missing row means nothing was spent.
  pub async fn usage(&self, tourist: &str, period: &str) -> Result<UsageSummary> {
    let total = plafond::Entity::find_by_id((tourist.to_string(), period.to_string()))
      .one(self.db)
      .await?
      .map(|row| row.total_used)
      .unwrap_or(Decimal::ZERO);

    Ok(self.summary(total))
  }

  /// Usage for the current calendar month.
  pub async fn current(&self, tourist: &str) -> Result<UsageSummary> {
    self.usage(tourist, &utils::current_period()).await
  }

  /// Adds `amount` to the tourist's counter for the current period, failing
  /// with `PlafondExceeded` when the cap would be breached. Runs on the
  /// caller's connection so it can share a transaction with `mark_used`.
  pub(crate) async fn charge<C: ConnectionTrait>(
    &self,
    conn: &C,
    tourist: &str,
    amount: Decimal,
  ) -> Result<UsageSummary> {
    let period = utils::current_period();
    let now = Utc::now().naive_utc();

    // Make sure the counter row exists; a concurrent insert is fine.
    let row = plafond::ActiveModel {
      tourist_code: Set(tourist.to_string()),
      period: Set(period.clone()),
      total_used: Set(Decimal::ZERO),
      updated_at: Set(now),
    };
    plafond::Entity::insert(row)
      .on_conflict(
        OnConflict::columns([
          plafond::Column::TouristCode,
          plafond::Column::Period,
        ])
        .do_nothing()
        .to_owned(),
      )
      .exec_without_returning(conn)
      .await?;

    // The cap filter makes the increment conditional: zero rows affected
    // means the charge would overflow the plafond.
    let rows = plafond::Entity::update_many()
      .col_expr(
        plafond::Column::TotalUsed,
        Expr::col(plafond::Column::TotalUsed).add(Expr::val(amount)),
      )
      .col_expr(plafond::Column::UpdatedAt, Expr::val(now).into())
      .filter(plafond::Column::TouristCode.eq(tourist))
      .filter(plafond::Column::Period.eq(&period))
      .filter(plafond::Column::TotalUsed.lte(self.cap - amount))
      .exec(conn)
      .await?
      .rows_affected;

    let total = plafond::Entity::find_by_id((tourist.to_string(), period))
      .one(conn)
      .await?
      .map(|row| row.total_used)
      .unwrap_or(Decimal::ZERO);

    if rows == 0 {
      return Err(Error::PlafondExceeded { remaining: self.summary(total).remaining });
    }

    Ok(self.summary(total))
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  use super::*;
  use crate::{
    entities::{self, iq_code::Role},
    services::IqCodes,
  };

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(entities::iq_code::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entities::plafond::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  #[tokio::test]
  async fn test_usage_starts_at_zero() {
    let db = setup_test_db().await;
    let ledger = Ledger::new(&db, Config::default());

    let usage = ledger.current("TIQ-TRT-AAAAA").await.unwrap();

    assert_eq!(usage.total_used, Decimal::ZERO);
    assert_eq!(usage.remaining, dec!(150.00));
  }

  #[tokio::test]
  async fn test_charge_accumulates() {
    let db = setup_test_db().await;
    let ledger = Ledger::new(&db, Config::default());
    let tourist = IqCodes::new(&db).create(Role::Tourist, None).await.unwrap();

    let usage = ledger.charge(&db, &tourist.code, dec!(20.00)).await.unwrap();
    assert_eq!(usage.total_used, dec!(20.00));

    let usage = ledger.charge(&db, &tourist.code, dec!(45.50)).await.unwrap();
    assert_eq!(usage.total_used, dec!(65.50));
    assert_eq!(usage.remaining, dec!(84.50));
  }

  #[tokio::test]
  async fn test_charge_rejects_overflow() {
    let db = setup_test_db().await;
    let ledger = Ledger::new(&db, Config::default());
    let tourist = IqCodes::new(&db).create(Role::Tourist, None).await.unwrap();

    ledger.charge(&db, &tourist.code, dec!(145.00)).await.unwrap();

    let result = ledger.charge(&db, &tourist.code, dec!(10.00)).await;
    assert!(
      matches!(result, Err(Error::PlafondExceeded { remaining }) if remaining == dec!(5.00))
    );

    // The failed charge must not have moved the counter.
    let usage = ledger.current(&tourist.code).await.unwrap();
    assert_eq!(usage.total_used, dec!(145.00));
  }

  #[tokio::test]
  async fn test_charge_to_exact_cap() {
    let db = setup_test_db().await;
    let ledger = Ledger::new(&db, Config::default());
    let tourist = IqCodes::new(&db).create(Role::Tourist, None).await.unwrap();

    ledger.charge(&db, &tourist.code, dec!(150.00)).await.unwrap();

    let usage = ledger.current(&tourist.code).await.unwrap();
    assert_eq!(usage.remaining, Decimal::ZERO);

    assert!(matches!(
      ledger.charge(&db, &tourist.code, dec!(0.01)).await,
      Err(Error::PlafondExceeded { .. })
    ));
  }
}
