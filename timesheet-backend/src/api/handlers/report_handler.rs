// src/api/handlers/report_handler.rs
use crate::api::dto::estimation_dto::EstimationQuery;
use crate::api::dto::report_dto::ReportQuery;
use crate::api::AppState;
use crate::domain::actor::Actor;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::types::ApiResponse;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

// --- レポート ---

pub async fn report_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let report = app_state.report_service.full_report(&actor, query).await?;
    Ok(ApiResponse::success(report))
}

pub async fn subsidiary_report_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let report = app_state.report_service.subsidiaries(&actor, query).await?;
    Ok(ApiResponse::success(report))
}

pub async fn service_report_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let report = app_state.report_service.services(&actor, query).await?;
    Ok(ApiResponse::success(report))
}

pub async fn employee_report_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let report = app_state.report_service.employees(&actor, query).await?;
    Ok(ApiResponse::success(report))
}

// --- 見積もり ---

pub async fn estimation_index_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<EstimationQuery>,
) -> AppResult<impl IntoResponse> {
    let result = app_state.estimation_service.index(&actor, query).await?;
    Ok(ApiResponse::success(result))
}

pub async fn estimation_detail_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(subsidiary_id): ValidatedUuid,
    Query(query): Query<EstimationQuery>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .estimation_service
        .subsidiary(&actor, subsidiary_id, query)
        .await?;
    Ok(ApiResponse::success(result))
}

// --- ダッシュボード ---

pub async fn dashboard_handler(
    State(app_state): State<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    let dashboard = app_state.dashboard_service.dashboard(&actor).await?;
    Ok(ApiResponse::success(dashboard))
}

pub fn report_router(app_state: AppState) -> Router {
    Router::new()
        .route("/reports", get(report_handler))
        .route("/reports/subsidiaries", get(subsidiary_report_handler))
        .route("/reports/services", get(service_report_handler))
        .route("/reports/employees", get(employee_report_handler))
        .route("/estimation", get(estimation_index_handler))
        .route("/estimation/{id}", get(estimation_detail_handler))
        .route("/dashboard", get(dashboard_handler))
        .with_state(app_state)
}
