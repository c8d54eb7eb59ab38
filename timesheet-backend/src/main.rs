// src/main.rs
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use timesheet_backend::api::{app_router, AppState};
use timesheet_backend::config::AppConfig;
use timesheet_backend::db::create_db_pool;
use timesheet_backend::middleware::auth::cors_layer;
use timesheet_backend::utils::email::EmailService;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // トレーシングの設定
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timesheet_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting Timesheet Backend server...");

    // 設定を読み込む
    let app_config = AppConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        addr = %app_config.server_addr(),
        email_enabled = app_config.notification.email_enabled,
        "Configuration loaded"
    );
    if app_config.is_production() && app_config.email.development_mode {
        tracing::warn!("SMTP is not configured; notification emails will only be logged");
    }

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    if app_config.run_migrations {
        Migrator::up(&db_pool, None).await?;
        tracing::info!("Database migrations applied.");
    }

    // 通知はメールで配送する
    let email_service = Arc::new(EmailService::new(app_config.email.clone())?);
    let app_state = AppState::new(db_pool, &app_config, email_service)?;

    let app = app_router(app_state)
        .layer(cors_layer(&app_config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    // サーバーの起動
    let addr = app_config.server_addr();
    tracing::info!("Router configured. Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
