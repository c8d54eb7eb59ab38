use sea_orm_migration::prelude::*;

use crate::m20250801_000002_create_subsidiaries_table::Subsidiaries;
use crate::m20250801_000003_create_services_table::Services;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 紐付けは削除せず is_active で切り替える
        manager
            .create_table(
                Table::create()
                    .table(SubsidiaryServices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SubsidiaryServices::SubsidiaryId).uuid().not_null())
                    .col(ColumnDef::new(SubsidiaryServices::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(SubsidiaryServices::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubsidiaryServices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(SubsidiaryServices::SubsidiaryId)
                            .col(SubsidiaryServices::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subsidiary_services_subsidiary_id")
                            .from(SubsidiaryServices::Table, SubsidiaryServices::SubsidiaryId)
                            .to(Subsidiaries::Table, Subsidiaries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subsidiary_services_service_id")
                            .from(SubsidiaryServices::Table, SubsidiaryServices::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubsidiaryServices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SubsidiaryServices {
    Table,
    SubsidiaryId,
    ServiceId,
    IsActive,
    CreatedAt,
}
