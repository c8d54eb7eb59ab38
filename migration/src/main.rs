// migration/src/main.rs
use migration::Migrator;
use sea_orm_migration::prelude::*;

// DATABASE_URL に対して up / down / status などを実行する CLI
#[async_std::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
