use sea_orm_migration::prelude::*;

use crate::m20250801_000002_create_subsidiaries_table::Subsidiaries;
use crate::m20250801_000003_create_services_table::Services;
use crate::m20250801_000004_create_employees_table::Employees;
use crate::m20250801_000005_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // (employee_id, subsidiary_id, work_date) に一意制約は付けない。同日・同子会社の複数入力を許可する
        manager
            .create_table(
                Table::create()
                    .table(TimeEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TimeEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TimeEntries::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(TimeEntries::SubsidiaryId).uuid().not_null())
                    .col(ColumnDef::new(TimeEntries::ServiceId).uuid().null())
                    .col(ColumnDef::new(TimeEntries::WorkDate).date().not_null())
                    .col(ColumnDef::new(TimeEntries::Minutes).integer().not_null())
                    .col(ColumnDef::new(TimeEntries::Note).text().null())
                    .col(ColumnDef::new(TimeEntries::Requester).string_len(255).null())
                    .col(
                        ColumnDef::new(TimeEntries::Status)
                            .string_len(20)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(TimeEntries::SubmittedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TimeEntries::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(TimeEntries::ApprovedBy).uuid().null())
                    .col(ColumnDef::new(TimeEntries::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(TimeEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TimeEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_entries_employee_id")
                            .from(TimeEntries::Table, TimeEntries::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_entries_subsidiary_id")
                            .from(TimeEntries::Table, TimeEntries::SubsidiaryId)
                            .to(Subsidiaries::Table, Subsidiaries::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_entries_service_id")
                            .from(TimeEntries::Table, TimeEntries::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_entries_approved_by")
                            .from(TimeEntries::Table, TimeEntries::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 集計・承認画面用のインデックス
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_time_entries_employee_date")
                    .table(TimeEntries::Table)
                    .col(TimeEntries::EmployeeId)
                    .col(TimeEntries::WorkDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_time_entries_subsidiary_date")
                    .table(TimeEntries::Table)
                    .col(TimeEntries::SubsidiaryId)
                    .col(TimeEntries::WorkDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_time_entries_status")
                    .table(TimeEntries::Table)
                    .col(TimeEntries::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimeEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TimeEntries {
    Table,
    Id,
    EmployeeId,
    SubsidiaryId,
    ServiceId,
    WorkDate,
    Minutes,
    Note,
    Requester,
    Status,
    SubmittedAt,
    ApprovedAt,
    ApprovedBy,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
}
