// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 組織マスタ
mod m20250801_000001_create_companies_table;
mod m20250801_000002_create_subsidiaries_table;
mod m20250801_000003_create_services_table;
mod m20250801_000004_create_employees_table;

// 認証・ロール
mod m20250801_000005_create_users_table;
mod m20250801_000006_create_roles_tables;

// 所属・紐付け
mod m20250801_000007_create_membership_tables;
mod m20250801_000008_create_subsidiary_services_table;

// 勤怠・通知
mod m20250801_000009_create_time_entries_table;
mod m20250801_000010_create_notifications_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 依存関係のないマスタ
            Box::new(m20250801_000001_create_companies_table::Migration),
            Box::new(m20250801_000002_create_subsidiaries_table::Migration),
            Box::new(m20250801_000003_create_services_table::Migration),
            Box::new(m20250801_000004_create_employees_table::Migration),
            // 2. ユーザーとロール（employeesに依存）
            Box::new(m20250801_000005_create_users_table::Migration),
            Box::new(m20250801_000006_create_roles_tables::Migration),
            // 3. 多対多の所属テーブル
            Box::new(m20250801_000007_create_membership_tables::Migration),
            Box::new(m20250801_000008_create_subsidiary_services_table::Migration),
            // 4. 勤怠入力と通知
            Box::new(m20250801_000009_create_time_entries_table::Migration),
            Box::new(m20250801_000010_create_notifications_table::Migration),
        ]
    }
}
