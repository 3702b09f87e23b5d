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
          .table(OneTimeCodes::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(OneTimeCodes::Code).string().not_null().primary_key(),
          )
          .col(ColumnDef::new(OneTimeCodes::TouristCode).string().not_null())
          .col(
            ColumnDef::new(OneTimeCodes::IsUsed)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(OneTimeCodes::UsedByPartner).string().null())
          .col(ColumnDef::new(OneTimeCodes::DiscountAmount).decimal_len(10, 2).null())
          .col(ColumnDef::new(OneTimeCodes::OriginalAmount).decimal_len(10, 2).null())
          .col(ColumnDef::new(OneTimeCodes::DiscountPercentage).integer().null())
          .col(ColumnDef::new(OneTimeCodes::OfferDescription).string().null())
          .col(ColumnDef::new(OneTimeCodes::UsedAt).date_time().null())
          .col(ColumnDef::new(OneTimeCodes::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_one_time_codes_tourist")
              .from(OneTimeCodes::Table, OneTimeCodes::TouristCode)
              .to(IqCodes::Table, IqCodes::Code)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_one_time_codes_tourist")
          .table(OneTimeCodes::Table)
          .col(OneTimeCodes::TouristCode)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_one_time_codes_partner")
          .table(OneTimeCodes::Table)
          .col(OneTimeCodes::UsedByPartner)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(OneTimeCodes::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum OneTimeCodes {
  Table,
  Code,
  TouristCode,
  IsUsed,
  UsedByPartner,
  DiscountAmount,
  OriginalAmount,
  DiscountPercentage,
  OfferDescription,
  UsedAt,
  CreatedAt,
}
