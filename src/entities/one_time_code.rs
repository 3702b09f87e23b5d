//! OneTimeCode entity - single-use discount codes (`TIQ-OTC-NNNNN`)
//!
//! The usage columns (`used_by_partner`, amounts, `used_at`) are written
//! together in the one `mark_used` transition and are null before it.
//! Consumers should go through [`Model::state`] instead of poking at the
//! optional columns, so a half-populated usage is unobservable.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "one_time_codes")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub code: String,
  pub tourist_code: String,
  pub is_used: bool,
  pub used_by_partner: Option<String>,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
  pub discount_amount: Option<Decimal>,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
  pub original_amount: Option<Decimal>,
  pub discount_percentage: Option<i32>,
  pub offer_description: Option<String>,
  pub used_at: Option<NaiveDateTime>,
  pub created_at: NaiveDateTime,
}

/// Everything recorded at the moment a code is consumed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Usage {
  pub partner_code: String,
  pub discount_amount: Decimal,
  pub original_amount: Decimal,
  pub discount_percentage: i32,
  pub offer_description: String,
  pub used_at: NaiveDateTime,
}

/// Tagged view over the flat row: a code is either unused or carries the
/// full usage record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum OtcState {
  Unused,
  Used(Usage),
}

impl Model {
  pub fn state(&self) -> OtcState {
    match (
      self.is_used,
      &self.used_by_partner,
      self.discount_amount,
      self.original_amount,
      self.discount_percentage,
      self.used_at,
    ) {
      (true, Some(partner), Some(discount), Some(original), Some(pct), Some(at)) => {
        OtcState::Used(Usage {
          partner_code: partner.clone(),
          discount_amount: discount,
          original_amount: original,
          discount_percentage: pct,
          offer_description: self.offer_description.clone().unwrap_or_default(),
          used_at: at,
        })
      }
      _ => OtcState::Unused,
    }
  }

  pub fn usage(&self) -> Option<Usage> {
    match self.state() {
      OtcState::Used(usage) => Some(usage),
      OtcState::Unused => None,
    }
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::iq_code::Entity",
    from = "Column::TouristCode",
    to = "super::iq_code::Column::Code"
  )]
  Tourist,
}

impl Related<super::iq_code::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Tourist.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
