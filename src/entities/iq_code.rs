//! IQCode entity - anonymous identity tokens for every platform role

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Platform role an IQCode is bound to at creation. Immutable afterwards.
#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[sea_orm(string_value = "tourist")]
  Tourist,
  #[sea_orm(string_value = "partner")]
  Partner,
  #[sea_orm(string_value = "structure")]
  Structure,
  #[sea_orm(string_value = "admin")]
  Admin,
}

impl Role {
  /// Short tag embedded in generated identifiers.
  pub fn tag(self) -> &'static str {
    match self {
      Role::Tourist => "TRT",
      Role::Partner => "PRT",
      Role::Structure => "STR",
      Role::Admin => "ADM",
    }
  }
}

/// The only mutable part of an IQCode.
#[derive(
  Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Status {
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "blocked")]
  Blocked,
  #[sea_orm(string_value = "deleted")]
  Deleted,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "iq_codes")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub code: String,
  pub role: Role,
  pub status: Status,
  /// For tourists: the structure that activated them, used by reporting.
  pub structure_code: Option<String>,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::one_time_code::Entity")]
  OneTimeCodes,
}

impl Related<super::one_time_code::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::OneTimeCodes.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
