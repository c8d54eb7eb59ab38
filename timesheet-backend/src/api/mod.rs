// timesheet-backend/src/api/mod.rs
use crate::api::handlers::{
    notification_handler::notification_router, organization_handler::organization_router,
    report_handler::report_router, system_handler::system_router,
    timesheet_handler::timesheet_router, validation_handler::validation_router,
};
use crate::config::AppConfig;
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{jwt_auth_middleware, AuthMiddlewareConfig};
use crate::service::{
    dashboard_service::DashboardService, employee_service::EmployeeService,
    estimation_service::EstimationService,
    notification_service::{NotificationService, NotificationSink},
    organization_service::OrganizationService, report_service::ReportService,
    scope_service::ScopeService, time_entry_service::TimeEntryService,
    validation_service::ValidationService,
};
use crate::utils::jwt::{JwtError, JwtManager};
use axum::{middleware as axum_middleware, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod dto;
pub mod handlers;

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub scope_service: Arc<ScopeService>,
    pub time_entry_service: Arc<TimeEntryService>,
    pub validation_service: Arc<ValidationService>,
    pub report_service: Arc<ReportService>,
    pub estimation_service: Arc<EstimationService>,
    pub dashboard_service: Arc<DashboardService>,
    pub notification_service: Arc<NotificationService>,
    pub organization_service: Arc<OrganizationService>,
    pub employee_service: Arc<EmployeeService>,
    pub jwt_manager: Arc<JwtManager>,
    pub db_pool: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// サービス群を組み立てる。通知の配送先は呼び出し側が決める
    pub fn new(
        db_pool: DatabaseConnection,
        app_config: &AppConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, JwtError> {
        let jwt_manager = Arc::new(JwtManager::new(app_config.jwt.clone())?);

        let scope_service = Arc::new(ScopeService::new(db_pool.clone()));
        let notification_service = Arc::new(NotificationService::new(
            db_pool.clone(),
            sink,
            app_config.notification.email_enabled,
        ));

        Ok(Self {
            time_entry_service: Arc::new(TimeEntryService::new(
                db_pool.clone(),
                scope_service.clone(),
                notification_service.clone(),
            )),
            validation_service: Arc::new(ValidationService::new(
                db_pool.clone(),
                scope_service.clone(),
                notification_service.clone(),
            )),
            report_service: Arc::new(ReportService::new(db_pool.clone(), scope_service.clone())),
            estimation_service: Arc::new(EstimationService::new(
                db_pool.clone(),
                scope_service.clone(),
            )),
            dashboard_service: Arc::new(DashboardService::new(
                db_pool.clone(),
                scope_service.clone(),
            )),
            organization_service: Arc::new(OrganizationService::new(db_pool.clone())),
            employee_service: Arc::new(EmployeeService::new(
                db_pool.clone(),
                scope_service.clone(),
            )),
            notification_service,
            scope_service,
            jwt_manager,
            db_pool: Arc::new(db_pool),
            config: Arc::new(app_config.clone()),
        })
    }

    pub fn auth_config(&self) -> AuthMiddlewareConfig {
        AuthMiddlewareConfig::new(self.jwt_manager.clone(), self.scope_service.clone())
    }
}

/// 全ルートと共通ミドルウェアを束ねたルーター
///
/// 外側から順に request context、ログ、認証が掛かる。
pub fn app_router(app_state: AppState) -> Router {
    let auth_config = app_state.auth_config();

    Router::new()
        .merge(system_router())
        .merge(timesheet_router(app_state.clone()))
        .merge(validation_router(app_state.clone()))
        .merge(report_router(app_state.clone()))
        .merge(notification_router(app_state.clone()))
        .merge(organization_router(app_state))
        .layer(axum_middleware::from_fn_with_state(
            auth_config,
            jwt_auth_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(axum_middleware::from_fn(inject_request_context))
}
