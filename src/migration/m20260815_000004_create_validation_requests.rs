use sea_orm_migration::prelude::*;

use super::m20260815_000001_create_iq_codes::IqCodes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ValidationRequests::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ValidationRequests::Id).uuid().not_null().primary_key(),
          )
          .col(ColumnDef::new(ValidationRequests::TouristCode).string().not_null())
          .col(ColumnDef::new(ValidationRequests::PartnerCode).string().not_null())
          .col(
            ColumnDef::new(ValidationRequests::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(ValidationRequests::UsesTotal).integer().not_null())
          .col(
            ColumnDef::new(ValidationRequests::UsesRemaining).integer().not_null(),
          )
          .col(
            ColumnDef::new(ValidationRequests::RequestedAt).date_time().not_null(),
          )
          .col(ColumnDef::new(ValidationRequests::RespondedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_validation_requests_tourist")
              .from(ValidationRequests::Table, ValidationRequests::TouristCode)
              .to(IqCodes::Table, IqCodes::Code)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_validation_requests_partner")
          .table(ValidationRequests::Table)
          .col(ValidationRequests::PartnerCode)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ValidationRequests::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum ValidationRequests {
  Table,
  Id,
  TouristCode,
  PartnerCode,
  Status,
  UsesTotal,
  UsesRemaining,
  RequestedAt,
  RespondedAt,
}
