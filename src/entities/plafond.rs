//! Plafond entity - per-tourist running counter of discount euros per period
//!
//! One row per (tourist, period). Updated only inside the same transaction
//! as the `mark_used` write, with a conditional increment that keeps
//! `total_used` under the cap.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plafond")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub tourist_code: String,
  /// Calendar month the counter belongs to, `%Y-%m`.
  #[sea_orm(primary_key, auto_increment = false)]
  pub period: String,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub total_used: Decimal,
  pub updated_at: NaiveDateTime,
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
