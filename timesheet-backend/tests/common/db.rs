// tests/common/db.rs
//! インメモリ SQLite のテスト用データベース

use migration::Migrator;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use timesheet_backend::config::AppConfig;
use timesheet_backend::db::create_db_pool;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    pub async fn new() -> Self {
        super::init_test_env();

        // テストごとに独立したDBになる
        let config = AppConfig::for_testing();
        let connection = create_db_pool(&config)
            .await
            .expect("connect to in-memory sqlite");

        Migrator::up(&connection, None)
            .await
            .expect("run migrations");

        Self { connection }
    }
}
