use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  entities::{
    iq_code::{self, Role, Status},
    one_time_code, validation_request,
  },
  prelude::*,
  services::{
    discounts::{DiscountResult, Validation},
    reports::{PartnerSummary, StructureSavings},
  },
  state::AppState,
};

pub async fn health() -> &'static str {
  "OK"
}

/// Code view exposed over HTTP: the usage fields come tagged through
/// [`crate::entities::OtcState`] instead of as loose nullable columns.
#[derive(Debug, Serialize)]
pub struct OtcView {
  pub code: String,
  pub created_at: DateTime,
  #[serde(flatten)]
  pub state: one_time_code::OtcState,
}

impl From<one_time_code::Model> for OtcView {
  fn from(model: one_time_code::Model) -> Self {
    Self { code: model.code.clone(), created_at: model.created_at, state: model.state() }
  }
}

#[derive(Debug, Deserialize)]
pub struct IqQuery {
  pub iq_code: String,
}

// --- one-time codes -------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateReq {
  pub iq_code: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateRes {
  pub success: bool,
  pub code: String,
  pub total_discount_used: Decimal,
  pub remaining_plafond: Decimal,
}

pub async fn generate_one_time_code(
  State(app): State<Arc<AppState>>,
  Json(req): Json<GenerateReq>,
) -> Result<Json<GenerateRes>> {
  let sv = app.sv();

  let otc = sv.codes.issue(&req.iq_code).await?;
  let usage = sv.ledger.current(&req.iq_code).await?;

  Ok(Json(GenerateRes {
    success: true,
    code: otc.code,
    total_discount_used: usage.total_used,
    remaining_plafond: usage.remaining,
  }))
}

#[derive(Debug, Serialize)]
pub struct TouristCodesRes {
  pub success: bool,
  pub codes: Vec<OtcView>,
  pub available_uses: i32,
  pub total_discount_used: Decimal,
  pub remaining_plafond: Decimal,
}

pub async fn tourist_codes(
  State(app): State<Arc<AppState>>,
  Query(query): Query<IqQuery>,
) -> Result<Json<TouristCodesRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&query.iq_code, Role::Tourist).await?;

  let codes = sv.codes.for_tourist(&query.iq_code).await?;
  let usage = sv.ledger.current(&query.iq_code).await?;
  let available_uses = sv.requests.available_uses(&query.iq_code).await?;

  Ok(Json(TouristCodesRes {
    success: true,
    codes: codes.into_iter().map(OtcView::from).collect(),
    available_uses,
    total_discount_used: usage.total_used,
    remaining_plafond: usage.remaining,
  }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateReq {
  pub iq_code: String,
  pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateRes {
  pub success: bool,
  #[serde(flatten)]
  pub validation: Validation,
}

pub async fn validate_one_time_code(
  State(app): State<Arc<AppState>>,
  Json(req): Json<ValidateReq>,
) -> Result<Json<ValidateRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&req.iq_code, Role::Partner).await?;

  let validation = sv.discounts.validate(&req.code).await?;
  Ok(Json(ValidateRes { success: true, validation }))
}

#[derive(Debug, Deserialize)]
pub struct ApplyReq {
  pub iq_code: String,
  pub code: String,
  pub original_amount: Decimal,
  pub discount_percentage: i32,
  #[serde(default)]
  pub offer_description: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyRes {
  pub success: bool,
  #[serde(flatten)]
  pub result: DiscountResult,
}

pub async fn apply_discount(
  State(app): State<Arc<AppState>>,
  Json(req): Json<ApplyReq>,
) -> Result<Json<ApplyRes>> {
  let result = app
    .sv()
    .discounts
    .apply(
      &req.iq_code,
      &req.code,
      req.original_amount,
      req.discount_percentage,
      &req.offer_description,
    )
    .await?;

  Ok(Json(ApplyRes { success: true, result }))
}

// --- legacy validation requests -------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RequestValidationReq {
  pub iq_code: String,
  pub tourist_code: String,
}

#[derive(Debug, Serialize)]
pub struct RequestRes {
  pub success: bool,
  pub request: validation_request::Model,
}

pub async fn request_validation(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RequestValidationReq>,
) -> Result<Json<RequestRes>> {
  let request = app.sv().requests.create(&req.iq_code, &req.tourist_code).await?;
  Ok(Json(RequestRes { success: true, request }))
}

#[derive(Debug, Deserialize)]
pub struct RespondValidationReq {
  pub iq_code: String,
  pub request_id: Uuid,
  pub accept: bool,
}

pub async fn respond_validation(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RespondValidationReq>,
) -> Result<Json<RequestRes>> {
  let request =
    app.sv().requests.respond(req.request_id, &req.iq_code, req.accept).await?;
  Ok(Json(RequestRes { success: true, request }))
}

#[derive(Debug, Deserialize)]
pub struct UseValidationReq {
  pub iq_code: String,
  pub request_id: Uuid,
}

pub async fn use_validation(
  State(app): State<Arc<AppState>>,
  Json(req): Json<UseValidationReq>,
) -> Result<Json<RequestRes>> {
  let request = app.sv().requests.consume(req.request_id, &req.iq_code).await?;
  Ok(Json(RequestRes { success: true, request }))
}

#[derive(Debug, Serialize)]
pub struct RequestListRes {
  pub success: bool,
  pub requests: Vec<validation_request::Model>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub available_uses: Option<i32>,
}

pub async fn tourist_requests(
  State(app): State<Arc<AppState>>,
  Query(query): Query<IqQuery>,
) -> Result<Json<RequestListRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&query.iq_code, Role::Tourist).await?;

  let requests = sv.requests.for_tourist(&query.iq_code).await?;
  let available_uses = sv.requests.available_uses(&query.iq_code).await?;

  Ok(Json(RequestListRes {
    success: true,
    requests,
    available_uses: Some(available_uses),
  }))
}

pub async fn partner_requests(
  State(app): State<Arc<AppState>>,
  Query(query): Query<IqQuery>,
) -> Result<Json<RequestListRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&query.iq_code, Role::Partner).await?;

  let requests = sv.requests.for_partner(&query.iq_code).await?;
  Ok(Json(RequestListRes { success: true, requests, available_uses: None }))
}

// --- reporting ------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PartnerStatsRes {
  pub success: bool,
  #[serde(flatten)]
  pub stats: PartnerSummary,
}

pub async fn partner_stats(
  State(app): State<Arc<AppState>>,
  Query(query): Query<IqQuery>,
) -> Result<Json<PartnerStatsRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&query.iq_code, Role::Partner).await?;

  let stats = sv.reports.partner_summary(&query.iq_code).await?;
  Ok(Json(PartnerStatsRes { success: true, stats }))
}

#[derive(Debug, Serialize)]
pub struct StructureSavingsRes {
  pub success: bool,
  #[serde(flatten)]
  pub savings: StructureSavings,
}

pub async fn structure_savings(
  State(app): State<Arc<AppState>>,
  Query(query): Query<IqQuery>,
) -> Result<Json<StructureSavingsRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&query.iq_code, Role::Structure).await?;

  let savings = sv.reports.structure_savings(&query.iq_code).await?;
  Ok(Json(StructureSavingsRes { success: true, savings }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub iq_code: String,
  pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryRes {
  pub success: bool,
  pub history: Vec<OtcView>,
}

pub async fn tourist_history(
  State(app): State<Arc<AppState>>,
  Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&query.iq_code, Role::Tourist).await?;

  let since = query
    .days
    .map(|days| Utc::now().naive_utc() - chrono::Duration::days(days));
  let history = sv.reports.tourist_history(&query.iq_code, since).await?;

  Ok(Json(HistoryRes {
    success: true,
    history: history.into_iter().map(OtcView::from).collect(),
  }))
}

// --- identity administration ----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateIqCodeReq {
  pub iq_code: String,
  pub role: Role,
  pub structure_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateIqCodeRes {
  pub success: bool,
  pub iqcode: iq_code::Model,
}

pub async fn create_iqcode(
  State(app): State<Arc<AppState>>,
  Json(req): Json<CreateIqCodeReq>,
) -> Result<Json<CreateIqCodeRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&req.iq_code, Role::Admin).await?;

  let iqcode = sv.iqcodes.create(req.role, req.structure_code).await?;
  Ok(Json(CreateIqCodeRes { success: true, iqcode }))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusReq {
  pub iq_code: String,
  pub code: String,
  pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct SetStatusRes {
  pub success: bool,
}

pub async fn set_iqcode_status(
  State(app): State<Arc<AppState>>,
  Json(req): Json<SetStatusReq>,
) -> Result<Json<SetStatusRes>> {
  let sv = app.sv();
  sv.iqcodes.require(&req.iq_code, Role::Admin).await?;

  sv.iqcodes.set_status(&req.code, req.status).await?;
  Ok(Json(SetStatusRes { success: true }))
}
