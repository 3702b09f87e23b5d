//! Code store - one-time discount codes and the single unused -> used path
//!
//! `mark_used` is the only place `is_used` is ever written. It is a
//! conditional UPDATE guarded on `is_used = false`, so two callers racing
//! on the same code get exactly one winner and the loser sees
//! `CodeAlreadyUsed`.

use rand::Rng;
use sea_orm::sea_query::Expr;

use crate::{
  entities::{iq_code::Role, one_time_code},
  prelude::*,
  services::{IqCodes, Ledger},
  state::Config,
};

pub struct Codes<'a> {
  db: &'a DatabaseConnection,
  config: Config,
}

impl<'a> Codes<'a> {
  pub fn new(db: &'a DatabaseConnection, config: Config) -> Self {
    Self { db, config }
  }

  fn random_code() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
    format!("{}{:05}", utils::OTC_PREFIX, suffix)
  }

  /// Issues a fresh unused code for a tourist. Refused outright when the
  /// plafond is exhausted; partial capacity still issues, since the discount
  /// amount is unknown until a partner applies the code.
  pub async fn issue(&self, tourist: &str) -> Result<one_time_code::Model> {
    IqCodes::new(self.db).require(tourist, Role::Tourist).await?;

    let usage = Ledger::new(self.db, self.config).current(tourist).await?;
    if usage.remaining <= Decimal::ZERO {
      return Err(Error::PlafondExhausted { remaining: usage.remaining });
    }

    // 5 digits is a small space; collisions are expected eventually, so
    // regenerate instead of assuming uniqueness.
    for _ in 0..self.config.issue_attempts {
      let code = Self::random_code();

      if one_time_code::Entity::find_by_id(&code).one(self.db).await?.is_some() {
        continue;
      }

      let now = Utc::now().naive_utc();
      let model = one_time_code::ActiveModel {
        code: Set(code),
        tourist_code: Set(tourist.to_string()),
        is_used: Set(false),
        used_by_partner: Set(None),
        discount_amount: Set(None),
        original_amount: Set(None),
        discount_percentage: Set(None),
        offer_description: Set(None),
        used_at: Set(None),
        created_at: Set(now),
      };

      match model.insert(self.db).await {
        Ok(model) => return Ok(model),
        // Lost a generation race; only a unique violation on the primary
        // key means collision, anything else is a real failure.
        Err(err)
          if matches!(
            err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
          ) =>
        {
          continue;
        }
        Err(err) => return Err(err.into()),
      }
    }

    Err(Error::DuplicateCode)
  }

  /// Lookup by full code string (callers normalize suffixes first).
  pub async fn by_code(&self, code: &str) -> Result<Option<one_time_code::Model>> {
    self.by_code_on(self.db, code).await
  }

  /// Same lookup on an explicit connection, for reads inside a transaction.
  pub(crate) async fn by_code_on<C: ConnectionTrait>(
    &self,
    conn: &C,
    code: &str,
  ) -> Result<Option<one_time_code::Model>> {
    let model = one_time_code::Entity::find_by_id(code).one(conn).await?;
    Ok(model)
  }

  /// All codes a tourist ever generated, newest first.
  pub async fn for_tourist(&self, tourist: &str) -> Result<Vec<one_time_code::Model>> {
    let codes = one_time_code::Entity::find()
      .filter(one_time_code::Column::TouristCode.eq(tourist))
      .order_by_desc(one_time_code::Column::CreatedAt)
      .order_by_desc(one_time_code::Column::Code)
      .all(self.db)
      .await?;
    Ok(codes)
  }

  /// The single mutation path for `is_used`. Generic over the connection so
  /// the application service can run it inside its transaction.
  #[allow(clippy::too_many_arguments)]
  pub(crate) async fn mark_used<C: ConnectionTrait>(
    &self,
    conn: &C,
    code: &str,
    partner: &str,
    discount_amount: Decimal,
    original_amount: Decimal,
    discount_percentage: i32,
    offer_description: &str,
  ) -> Result<()> {
    let now = Utc::now().naive_utc();

    let rows = one_time_code::Entity::update_many()
      .col_expr(one_time_code::Column::IsUsed, Expr::val(true).into())
      .col_expr(
        one_time_code::Column::UsedByPartner,
        Expr::val(partner.to_string()).into(),
      )
      .col_expr(
        one_time_code::Column::DiscountAmount,
        Expr::val(discount_amount).into(),
      )
      .col_expr(
        one_time_code::Column::OriginalAmount,
        Expr::val(original_amount).into(),
      )
      .col_expr(
        one_time_code::Column::DiscountPercentage,
        Expr::val(discount_percentage).into(),
      )
      .col_expr(
        one_time_code::Column::OfferDescription,
        Expr::val(offer_description.to_string()).into(),
      )
      .col_expr(one_time_code::Column::UsedAt, Expr::val(now).into())
      .filter(one_time_code::Column::Code.eq(code))
      .filter(one_time_code::Column::IsUsed.eq(false))
      .exec(conn)
      .await?
      .rows_affected;

    if rows == 1 {
      return Ok(());
    }

    match one_time_code::Entity::find_by_id(code).one(conn).await? {
      Some(_) => Err(Error::CodeAlreadyUsed),
      None => Err(Error::CodeNotFound),
    }
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  use super::*;
  use crate::entities::{self, one_time_code::OtcState};

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(entities::iq_code::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entities::one_time_code::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(entities::plafond::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  async fn seed_tourist(db: &DatabaseConnection) -> String {
    IqCodes::new(db)
      .create(Role::Tourist, None)
      .await
      .unwrap()
      .code
  }

  #[tokio::test]
  async fn test_issue_code_format() {
    let db = setup_test_db().await;
    let tourist = seed_tourist(&db).await;

    let otc = Codes::new(&db, Config::default()).issue(&tourist).await.unwrap();

    assert!(otc.code.starts_with("TIQ-OTC-"));
    assert_eq!(otc.code.len(), "TIQ-OTC-".len() + 5);
    assert!(!otc.is_used);
    assert_eq!(otc.state(), OtcState::Unused);
  }

  #[tokio::test]
  async fn test_issue_refused_for_unknown_tourist() {
    let db = setup_test_db().await;

    let result = Codes::new(&db, Config::default()).issue("TIQ-TRT-ZZZZZ").await;
    assert!(matches!(result, Err(Error::IqCodeNotFound)));
  }

  #[tokio::test]
  async fn test_issue_refused_when_plafond_exhausted() {
    let db = setup_test_db().await;
    let config = Config::default();
    let tourist = seed_tourist(&db).await;

    Ledger::new(&db, config).charge(&db, &tourist, dec!(150.00)).await.unwrap();

    let result = Codes::new(&db, config).issue(&tourist).await;
    assert!(matches!(result, Err(Error::PlafondExhausted { .. })));
  }

  #[tokio::test]
  async fn test_mark_used_once() {
    let db = setup_test_db().await;
    let sv = Codes::new(&db, Config::default());
    let tourist = seed_tourist(&db).await;

    let otc = sv.issue(&tourist).await.unwrap();

    sv.mark_used(&db, &otc.code, "TIQ-PRT-AAAAA", dec!(20.00), dec!(100.00), 20, "menu")
      .await
      .unwrap();

    let otc = sv.by_code(&otc.code).await.unwrap().unwrap();
    let usage = otc.usage().unwrap();
    assert_eq!(usage.discount_amount, dec!(20.00));
    assert_eq!(usage.partner_code, "TIQ-PRT-AAAAA");

    let again = sv
      .mark_used(&db, &otc.code, "TIQ-PRT-BBBBB", dec!(5.00), dec!(10.00), 50, "bis")
      .await;
    assert!(matches!(again, Err(Error::CodeAlreadyUsed)));

    // The losing write must not have touched the record.
    let unchanged = sv.by_code(&otc.code).await.unwrap().unwrap();
    assert_eq!(unchanged.usage().unwrap().partner_code, "TIQ-PRT-AAAAA");
  }

  #[tokio::test]
  async fn test_mark_used_unknown_code() {
    let db = setup_test_db().await;
    let sv = Codes::new(&db, Config::default());

    let result = sv
      .mark_used(&db, "TIQ-OTC-99999", "TIQ-PRT-AAAAA", dec!(1.00), dec!(10.00), 10, "")
      .await;
    assert!(matches!(result, Err(Error::CodeNotFound)));
  }

  #[tokio::test]
  async fn test_codes_listed_newest_first() {
    let db = setup_test_db().await;
    let sv = Codes::new(&db, Config::default());
    let tourist = seed_tourist(&db).await;

    let first = sv.issue(&tourist).await.unwrap();
    let second = sv.issue(&tourist).await.unwrap();

    let listed = sv.for_tourist(&tourist).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|c| c.code == first.code));
    assert!(listed.iter().any(|c| c.code == second.code));
  }

  #[tokio::test]
  async fn test_duplicate_insert_reads_as_unique_violation() {
    let db = setup_test_db().await;
    let tourist = seed_tourist(&db).await;

    let row = |code: &str| one_time_code::ActiveModel {
      code: Set(code.to_string()),
      tourist_code: Set(tourist.clone()),
      is_used: Set(false),
      used_by_partner: Set(None),
      discount_amount: Set(None),
      original_amount: Set(None),
      discount_percentage: Set(None),
      offer_description: Set(None),
      used_at: Set(None),
      created_at: Set(Utc::now().naive_utc()),
    };

    row("TIQ-OTC-11111").insert(&db).await.unwrap();

    // Issuance retries only on this classification; a suffix collision
    // must not read as a generic database failure.
    let err = row("TIQ-OTC-11111").insert(&db).await.unwrap_err();
    assert!(matches!(
      err.sql_err(),
      Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ));
  }
}
