use sea_orm_migration::prelude::*;

use crate::m20250801_000001_create_companies_table::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subsidiaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subsidiaries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subsidiaries::CompanyId).uuid().null())
                    .col(
                        ColumnDef::new(Subsidiaries::Code)
                            .string_len(30)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Subsidiaries::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Subsidiaries::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Subsidiaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Subsidiaries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subsidiaries_company_id")
                            .from(Subsidiaries::Table, Subsidiaries::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subsidiaries_company_id")
                    .table(Subsidiaries::Table)
                    .col(Subsidiaries::CompanyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subsidiaries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Subsidiaries {
    Table,
    Id,
    CompanyId,
    Code,
    Name,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
