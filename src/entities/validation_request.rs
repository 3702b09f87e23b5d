//! ValidationRequest entity - the legacy 10-use partner/tourist handshake
//!
//! Distinct from one-time codes: a partner asks, the tourist answers once
//! (pending -> accepted | rejected, terminal), and an accepted request
//! carries a use counter the partner draws down.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "accepted")]
  Accepted,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "validation_requests")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: Uuid,
  pub tourist_code: String,
  pub partner_code: String,
  pub status: RequestStatus,
  pub uses_total: i32,
  pub uses_remaining: i32,
  pub requested_at: NaiveDateTime,
  pub responded_at: Option<NaiveDateTime>,
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
