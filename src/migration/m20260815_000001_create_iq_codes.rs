use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(IqCodes::Table)
          .if_not_exists()
          .col(ColumnDef::new(IqCodes::Code).string().not_null().primary_key())
          .col(ColumnDef::new(IqCodes::Role).string().not_null())
          .col(
            ColumnDef::new(IqCodes::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(ColumnDef::new(IqCodes::StructureCode).string().null())
          .col(ColumnDef::new(IqCodes::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_iq_codes_structure")
          .table(IqCodes::Table)
          .col(IqCodes::StructureCode)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(IqCodes::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum IqCodes {
  Table,
  Code,
  Role,
  Status,
  StructureCode,
  CreatedAt,
}
