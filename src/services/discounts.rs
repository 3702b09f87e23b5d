//! Discount validation and application - the partner-facing two-phase flow
//!
//! Phase 1 (`validate`) is a read-only existence/used check a partner runs
//! when the tourist hands over the 5-digit suffix. Phase 2 (`apply`) happens
//! at the till once the bill is known: it recomputes the discount, re-checks
//! the code, charges the plafond and consumes the code in one transaction.
//!
//! Overflow policy: a discount that would push the monthly total past the
//! cap is rejected with `PlafondExceeded`, never silently clamped. The
//! partner can retry with a smaller bill; the code stays unused.

use serde::Serialize;

use crate::{
  entities::iq_code::Role,
  prelude::*,
  services::{Codes, IqCodes, Ledger},
  state::Config,
};

/// Phase 1 outcome. Lookup misses are a value, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
  pub valid: bool,
  pub used: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tourist_code: Option<String>,
}

impl Validation {
  fn miss() -> Self {
    Self { valid: false, used: false, tourist_code: None }
  }
}

/// Phase 2 outcome, returned to the partner and shown on the receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountResult {
  pub code: String,
  pub discount_amount: Decimal,
  pub final_amount: Decimal,
  pub new_total_used: Decimal,
  pub remaining_plafond: Decimal,
}

pub struct Discounts<'a> {
  db: &'a DatabaseConnection,
  config: Config,
}

impl<'a> Discounts<'a> {
  pub fn new(db: &'a DatabaseConnection, config: Config) -> Self {
    Self { db, config }
  }

  /// Read-only check. Accepts the bare 5-digit suffix or the full string;
  /// anything malformed or unknown reads as invalid, never as an error.
  pub async fn validate(&self, raw_code: &str) -> Result<Validation> {
    let Some(code) = utils::normalize_otc(raw_code) else {
      return Ok(Validation::miss());
    };

    match Codes::new(self.db, self.config).by_code(&code).await? {
      Some(otc) => Ok(Validation {
        valid: true,
        used: otc.is_used,
        tourist_code: Some(otc.tourist_code),
      }),
      None => Ok(Validation::miss()),
    }
  }

  /// Accepted percentage range is (0, 100]: a zero-percent application
  /// would consume the code while granting nothing.
  fn check_inputs(original_amount: Decimal, percentage: i32) -> Result<()> {
    if original_amount <= Decimal::ZERO {
      return Err(Error::Validation(
        "original_amount must be greater than zero".into(),
      ));
    }
    if !(1..=100).contains(&percentage) {
      return Err(Error::Validation(
        "discount_percentage must be between 1 and 100".into(),
      ));
    }
    Ok(())
  }

  /// Consumes a code and records the discount. Not idempotent: a timed-out
  /// call must be recovered with `validate`, never blindly retried.
  pub async fn apply(
    &self,
    partner: &str,
    raw_code: &str,
    original_amount: Decimal,
    percentage: i32,
    offer_description: &str,
  ) -> Result<DiscountResult> {
    IqCodes::new(self.db).require(partner, Role::Partner).await?;
    Self::check_inputs(original_amount, percentage)?;

    let code = utils::normalize_otc(raw_code).ok_or(Error::CodeNotFound)?;
    let discount_amount =
      utils::round_money(original_amount * Decimal::from(percentage) / dec!(100));

    let codes = Codes::new(self.db, self.config);
    let ledger = Ledger::new(self.db, self.config);

    let txn = self.db.begin().await?;

    // Phase 1 may be minutes stale; re-read inside the transaction.
    let otc = codes
      .by_code_on(&txn, &code)
      .await?
      .ok_or(Error::CodeNotFound)?;
    if otc.is_used {
      return Err(Error::CodeAlreadyUsed);
    }

    // Charge first: if the cap rejects, the transaction rolls back with the
    // code untouched. The conditional update in mark_used still closes the
    // race against a concurrent apply on the same code.
    let usage = ledger.charge(&txn, &otc.tourist_code, discount_amount).await?;

    codes
      .mark_used(
        &txn,
        &code,
        partner,
        discount_amount,
        original_amount,
        percentage,
        offer_description,
      )
      .await?;

    txn.commit().await?;

    info!(
      %code,
      partner,
      %discount_amount,
      total_used = %usage.total_used,
      "discount applied"
    );

    Ok(DiscountResult {
      code,
      discount_amount,
      final_amount: original_amount - discount_amount,
      new_total_used: usage.total_used,
      remaining_plafond: usage.remaining,
    })
  }
}
