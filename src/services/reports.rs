//! Reporting projection - read-only aggregation over the code store
//!
//! Derived, never authoritative: everything here is recomputed from used
//! one-time codes on each call, and dashboards tolerate a short staleness
//! window. Nothing in this module writes.

use serde::Serialize;

use crate::{
  entities::{
    iq_code::{self, Role},
    one_time_code,
  },
  prelude::*,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerSummary {
  pub transactions: u64,
  pub total_discount: Decimal,
  pub total_original: Decimal,
  pub average_discount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureSavings {
  pub tourists: u64,
  pub transactions: u64,
  pub total_discount: Decimal,
}

pub struct Reports<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Reports<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// What a partner has granted so far, for their dashboard.
  pub async fn partner_summary(&self, partner: &str) -> Result<PartnerSummary> {
    let used = one_time_code::Entity::find()
      .filter(one_time_code::Column::UsedByPartner.eq(partner))
      .filter(one_time_code::Column::IsUsed.eq(true))
      .all(self.db)
      .await?;

    let mut total_discount = Decimal::ZERO;
    let mut total_original = Decimal::ZERO;
    for usage in used.iter().filter_map(|otc| otc.usage()) {
      total_discount += usage.discount_amount;
      total_original += usage.original_amount;
    }

    let transactions = used.len() as u64;
    let average_discount = if transactions == 0 {
      Decimal::ZERO
    } else {
      utils::round_money(total_discount / Decimal::from(transactions))
    };

    Ok(PartnerSummary {
      transactions,
      total_discount,
      total_original,
      average_discount,
    })
  }

  /// Savings accumulated by the guests a structure activated.
  pub async fn structure_savings(&self, structure: &str) -> Result<StructureSavings> {
    let tourists: Vec<String> = iq_code::Entity::find()
      .filter(iq_code::Column::Role.eq(Role::Tourist))
      .filter(iq_code::Column::StructureCode.eq(structure))
      .all(self.db)
      .await?
      .into_iter()
      .map(|model| model.code)
      .collect();

    if tourists.is_empty() {
      return Ok(StructureSavings {
        tourists: 0,
        transactions: 0,
        total_discount: Decimal::ZERO,
      });
    }

    let used = one_time_code::Entity::find()
      .filter(one_time_code::Column::TouristCode.is_in(tourists.clone()))
      .filter(one_time_code::Column::IsUsed.eq(true))
      .all(self.db)
      .await?;

    let total_discount = used
      .iter()
      .filter_map(|otc| otc.usage())
      .map(|usage| usage.discount_amount)
      .sum();

    Ok(StructureSavings {
      tourists: tourists.len() as u64,
      transactions: used.len() as u64,
      total_discount,
    })
  }

  /// Used codes of a tourist inside a time window, newest first.
  pub async fn tourist_history(
    &self,
    tourist: &str,
    since: Option<DateTime>,
  ) -> Result<Vec<one_time_code::Model>> {
    let mut query = one_time_code::Entity::find()
      .filter(one_time_code::Column::TouristCode.eq(tourist))
      .filter(one_time_code::Column::IsUsed.eq(true));

    if let Some(since) = since {
      query = query.filter(one_time_code::Column::UsedAt.gte(since));
    }

    let codes =
      query.order_by_desc(one_time_code::Column::UsedAt).all(self.db).await?;
    Ok(codes)
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  use super::*;
  use crate::{
    entities,
    services::{Codes, IqCodes},
    state::Config,
  };

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    for stmt in [
      schema.create_table_from_entity(entities::iq_code::Entity),
      schema.create_table_from_entity(entities::one_time_code::Entity),
      schema.create_table_from_entity(entities::plafond::Entity),
    ] {
      db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
    }

    db
  }

  #[tokio::test]
  async fn test_partner_summary() {
    let db = setup_test_db().await;
    let config = Config::default();
    let iqcodes = IqCodes::new(&db);
    let codes = Codes::new(&db, config);

    let tourist = iqcodes.create(Role::Tourist, None).await.unwrap().code;
    let partner = iqcodes.create(Role::Partner, None).await.unwrap().code;

    for (original, pct) in [(dec!(100.00), 20), (dec!(50.00), 10)] {
      let otc = codes.issue(&tourist).await.unwrap();
      let discount = utils::round_money(original * Decimal::from(pct) / dec!(100));
      codes
        .mark_used(&db, &otc.code, &partner, discount, original, pct, "")
        .await
        .unwrap();
    }

    let summary = Reports::new(&db).partner_summary(&partner).await.unwrap();
    assert_eq!(summary.transactions, 2);
    assert_eq!(summary.total_discount, dec!(25.00));
    assert_eq!(summary.total_original, dec!(150.00));
    assert_eq!(summary.average_discount, dec!(12.50));
  }

  #[tokio::test]
  async fn test_empty_partner_summary() {
    let db = setup_test_db().await;

    let summary =
      Reports::new(&db).partner_summary("TIQ-PRT-EMPTY").await.unwrap();
    assert_eq!(summary.transactions, 0);
    assert_eq!(summary.average_discount, Decimal::ZERO);
  }

  #[tokio::test]
  async fn test_structure_savings() {
    let db = setup_test_db().await;
    let config = Config::default();
    let iqcodes = IqCodes::new(&db);
    let codes = Codes::new(&db, config);

    let structure = iqcodes.create(Role::Structure, None).await.unwrap().code;
    let guest = iqcodes
      .create(Role::Tourist, Some(structure.clone()))
      .await
      .unwrap()
      .code;
    let outsider = iqcodes.create(Role::Tourist, None).await.unwrap().code;
    let partner = iqcodes.create(Role::Partner, None).await.unwrap().code;

    for tourist in [&guest, &outsider] {
      let otc = codes.issue(tourist).await.unwrap();
      codes
        .mark_used(&db, &otc.code, &partner, dec!(15.00), dec!(100.00), 15, "")
        .await
        .unwrap();
    }

    let savings =
      Reports::new(&db).structure_savings(&structure).await.unwrap();
    assert_eq!(savings.tourists, 1);
    assert_eq!(savings.transactions, 1);
    assert_eq!(savings.total_discount, dec!(15.00));
  }

  #[tokio::test]
  async fn test_tourist_history_only_used() {
    let db = setup_test_db().await;
    let config = Config::default();
    let iqcodes = IqCodes::new(&db);
    let codes = Codes::new(&db, config);

    let tourist = iqcodes.create(Role::Tourist, None).await.unwrap().code;
    let partner = iqcodes.create(Role::Partner, None).await.unwrap().code;

    let used = codes.issue(&tourist).await.unwrap();
    codes
      .mark_used(&db, &used.code, &partner, dec!(5.00), dec!(50.00), 10, "")
      .await
      .unwrap();
    codes.issue(&tourist).await.unwrap();

    let history =
      Reports::new(&db).tourist_history(&tourist, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].code, used.code);
  }
}
