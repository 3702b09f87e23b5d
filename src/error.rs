//! Error types for the discount ledger server

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("iqcode not found")]
  IqCodeNotFound,

  #[error("iqcode is not active")]
  IqCodeInactive,

  #[error("one-time code not found")]
  CodeNotFound,

  #[error("one-time code already used")]
  CodeAlreadyUsed,

  #[error("could not generate a unique code")]
  DuplicateCode,

  #[error("plafond exhausted, {remaining} remaining")]
  PlafondExhausted { remaining: Decimal },

  #[error("plafond exceeded, {remaining} remaining")]
  PlafondExceeded { remaining: Decimal },

  #[error("validation error: {0}")]
  Validation(String),

  #[error("validation request not found")]
  RequestNotFound,

  #[error("validation request already resolved")]
  RequestResolved,

  #[error("validation request has no uses remaining")]
  RequestExhausted,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    // Partners must not be able to tell an unknown code from a spent one,
    // otherwise the 5-digit suffix space becomes enumerable.
    let (status, message) = match &self {
      Error::Database(err) => {
        tracing::error!("database error: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into())
      }
      Error::IqCodeNotFound => (StatusCode::NOT_FOUND, "IQCode not found".into()),
      Error::IqCodeInactive => {
        (StatusCode::FORBIDDEN, "IQCode is blocked or deleted".into())
      }
      Error::CodeNotFound | Error::CodeAlreadyUsed => {
        (StatusCode::CONFLICT, "Code invalid or already used".into())
      }
      Error::DuplicateCode => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not generate code".into())
      }
      Error::PlafondExhausted { remaining } => (
        StatusCode::CONFLICT,
        format!("Monthly discount plafond exhausted ({remaining} EUR remaining)"),
      ),
      Error::PlafondExceeded { remaining } => (
        StatusCode::CONFLICT,
        format!("Discount exceeds monthly plafond ({remaining} EUR remaining)"),
      ),
      Error::Validation(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
      Error::RequestNotFound => {
        (StatusCode::NOT_FOUND, "Validation request not found".into())
      }
      Error::RequestResolved => {
        (StatusCode::CONFLICT, "Validation request already resolved".into())
      }
      Error::RequestExhausted => {
        (StatusCode::CONFLICT, "Validation request has no uses remaining".into())
      }
    };

    let body = json::json!({
      "success": false,
      "message": message,
    });

    (status, Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;
