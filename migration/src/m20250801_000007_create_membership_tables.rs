use sea_orm_migration::prelude::*;

use crate::m20250801_000002_create_subsidiaries_table::Subsidiaries;
use crate::m20250801_000003_create_services_table::Services;
use crate::m20250801_000004_create_employees_table::Employees;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 従業員 ⇔ 子会社
        manager
            .create_table(
                Table::create()
                    .table(EmployeeSubsidiaries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeSubsidiaries::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(EmployeeSubsidiaries::SubsidiaryId).uuid().not_null())
                    .col(
                        ColumnDef::new(EmployeeSubsidiaries::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(EmployeeSubsidiaries::StartDate).date().null())
                    .col(ColumnDef::new(EmployeeSubsidiaries::EndDate).date().null())
                    .col(
                        ColumnDef::new(EmployeeSubsidiaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmployeeSubsidiaries::EmployeeId)
                            .col(EmployeeSubsidiaries::SubsidiaryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_subsidiaries_employee_id")
                            .from(EmployeeSubsidiaries::Table, EmployeeSubsidiaries::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_subsidiaries_subsidiary_id")
                            .from(EmployeeSubsidiaries::Table, EmployeeSubsidiaries::SubsidiaryId)
                            .to(Subsidiaries::Table, Subsidiaries::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 従業員 ⇔ サービス（マネージャーの管轄判定に使用）
        manager
            .create_table(
                Table::create()
                    .table(EmployeeServices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeServices::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(EmployeeServices::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(EmployeeServices::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(EmployeeServices::StartDate).date().null())
                    .col(ColumnDef::new(EmployeeServices::EndDate).date().null())
                    .col(
                        ColumnDef::new(EmployeeServices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmployeeServices::EmployeeId)
                            .col(EmployeeServices::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_services_employee_id")
                            .from(EmployeeServices::Table, EmployeeServices::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_services_service_id")
                            .from(EmployeeServices::Table, EmployeeServices::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_services_service_id")
                    .table(EmployeeServices::Table)
                    .col(EmployeeServices::ServiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_subsidiaries_subsidiary_id")
                    .table(EmployeeSubsidiaries::Table)
                    .col(EmployeeSubsidiaries::SubsidiaryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmployeeServices::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EmployeeSubsidiaries::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum EmployeeSubsidiaries {
    Table,
    EmployeeId,
    SubsidiaryId,
    IsPrimary,
    StartDate,
    EndDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmployeeServices {
    Table,
    EmployeeId,
    ServiceId,
    IsPrimary,
    StartDate,
    EndDate,
    CreatedAt,
}
