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
          .table(Plafond::Table)
          .if_not_exists()
          .col(ColumnDef::new(Plafond::TouristCode).string().not_null())
          .col(ColumnDef::new(Plafond::Period).string().not_null())
          .col(
            ColumnDef::new(Plafond::TotalUsed)
              .decimal_len(10, 2)
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Plafond::UpdatedAt).date_time().not_null())
          .primary_key(
            Index::create().col(Plafond::TouristCode).col(Plafond::Period),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_plafond_tourist")
              .from(Plafond::Table, Plafond::TouristCode)
              .to(IqCodes::Table, IqCodes::Code)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Plafond::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Plafond {
  Table,
  TouristCode,
  Period,
  TotalUsed,
  UpdatedAt,
}
