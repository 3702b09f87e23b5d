//! Validation requests - the older 10-use partner/tourist handshake
//!
//! Kept as its own subsystem next to one-time codes: a partner asks for a
//! validation, the tourist accepts or rejects exactly once, and an accepted
//! request grants a fixed number of uses the partner draws down. No money
//! moves here; the plafond only ever sees one-time codes.

use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
  entities::{
    iq_code::Role,
    validation_request::{self, RequestStatus},
  },
  prelude::*,
  services::IqCodes,
  state::Config,
};

pub struct Requests<'a> {
  db: &'a DatabaseConnection,
  config: Config,
}

impl<'a> Requests<'a> {
  pub fn new(db: &'a DatabaseConnection, config: Config) -> Self {
    Self { db, config }
  }

  pub async fn create(
    &self,
    partner: &str,
    tourist: &str,
  ) -> Result<validation_request::Model> {
    let iqcodes = IqCodes::new(self.db);
    iqcodes.require(partner, Role::Partner).await?;
    iqcodes.require(tourist, Role::Tourist).await?;

    let now = Utc::now().naive_utc();
    let request = validation_request::ActiveModel {
      id: Set(Uuid::new_v4()),
      tourist_code: Set(tourist.to_string()),
      partner_code: Set(partner.to_string()),
      status: Set(RequestStatus::Pending),
      uses_total: Set(self.config.request_uses),
      uses_remaining: Set(self.config.request_uses),
      requested_at: Set(now),
      responded_at: Set(None),
    };

    Ok(request.insert(self.db).await?)
  }

  async fn by_id(&self, id: Uuid) -> Result<validation_request::Model> {
    validation_request::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::RequestNotFound)
  }

  /// The tourist's one-shot answer. The `status = pending` guard in the
  /// update makes the transition terminal even under concurrent responses.
  pub async fn respond(
    &self,
    id: Uuid,
    tourist: &str,
    accept: bool,
  ) -> Result<validation_request::Model> {
    let request = self.by_id(id).await?;
    if request.tourist_code != tourist {
      return Err(Error::RequestNotFound);
    }

    let status =
      if accept { RequestStatus::Accepted } else { RequestStatus::Rejected };
    let now = Utc::now().naive_utc();

    let rows = validation_request::Entity::update_many()
      .col_expr(validation_request::Column::Status, Expr::val(status).into())
      .col_expr(validation_request::Column::RespondedAt, Expr::val(now).into())
      .filter(validation_request::Column::Id.eq(id))
      .filter(validation_request::Column::Status.eq(RequestStatus::Pending))
      .exec(self.db)
      .await?
      .rows_affected;

    if rows == 0 {
      return Err(Error::RequestResolved);
    }

    self.by_id(id).await
  }

  /// Burns one use of an accepted request. Conditional decrement, so two
  /// partner terminals cannot spend the last use twice.
  pub async fn consume(
    &self,
    id: Uuid,
    partner: &str,
  ) -> Result<validation_request::Model> {
    let request = self.by_id(id).await?;
    if request.partner_code != partner {
      return Err(Error::RequestNotFound);
    }

    match request.status {
      RequestStatus::Pending => {
        return Err(Error::Validation("request not yet accepted".into()));
      }
      RequestStatus::Rejected => return Err(Error::RequestResolved),
      RequestStatus::Accepted => {}
    }

    let rows = validation_request::Entity::update_many()
      .col_expr(
        validation_request::Column::UsesRemaining,
        Expr::col(validation_request::Column::UsesRemaining).sub(Expr::val(1)),
      )
      .filter(validation_request::Column::Id.eq(id))
      .filter(validation_request::Column::Status.eq(RequestStatus::Accepted))
      .filter(validation_request::Column::UsesRemaining.gt(0))
      .exec(self.db)
      .await?
      .rows_affected;

    if rows == 0 {
      return Err(Error::RequestExhausted);
    }

    self.by_id(id).await
  }

  pub async fn for_tourist(
    &self,
    tourist: &str,
  ) -> Result<Vec<validation_request::Model>> {
    let requests = validation_request::Entity::find()
      .filter(validation_request::Column::TouristCode.eq(tourist))
      .order_by_desc(validation_request::Column::RequestedAt)
      .all(self.db)
      .await?;
    Ok(requests)
  }

  pub async fn for_partner(
    &self,
    partner: &str,
  ) -> Result<Vec<validation_request::Model>> {
    let requests = validation_request::Entity::find()
      .filter(validation_request::Column::PartnerCode.eq(partner))
      .order_by_desc(validation_request::Column::RequestedAt)
      .all(self.db)
      .await?;
    Ok(requests)
  }

  /// Uses still available to a tourist across accepted requests, surfaced
  /// on the tourist dashboard next to their codes.
  pub async fn available_uses(&self, tourist: &str) -> Result<i32> {
    let total = self
      .for_tourist(tourist)
      .await?
      .iter()
      .filter(|request| request.status == RequestStatus::Accepted)
      .map(|request| request.uses_remaining)
      .sum();
    Ok(total)
  }
}
