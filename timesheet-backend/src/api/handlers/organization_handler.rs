// src/api/handlers/organization_handler.rs
use crate::api::dto::organization_dto::{ServiceLinkRequest, SyncServicesRequest};
use crate::api::AppState;
use crate::domain::actor::Actor;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::types::ApiResponse;
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

pub async fn subsidiary_services_handler(
    State(app_state): State<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    let result = app_state.organization_service.list(&actor).await?;
    Ok(ApiResponse::success(result))
}

pub async fn attach_service_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(subsidiary_id): ValidatedUuid,
    Json(payload): Json<ServiceLinkRequest>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .organization_service
        .attach(&actor, subsidiary_id, payload.service_id)
        .await?;
    Ok(ApiResponse::success_with_message(result, "Service attached"))
}

pub async fn detach_service_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(subsidiary_id): ValidatedUuid,
    Json(payload): Json<ServiceLinkRequest>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .organization_service
        .detach(&actor, subsidiary_id, payload.service_id)
        .await?;
    Ok(ApiResponse::success_with_message(result, "Service detached"))
}

pub async fn sync_services_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(subsidiary_id): ValidatedUuid,
    Json(payload): Json<SyncServicesRequest>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .organization_service
        .sync(&actor, subsidiary_id, payload.service_ids)
        .await?;
    Ok(ApiResponse::success_with_message(result, "Services synchronized"))
}

// --- 従業員 ---

pub async fn visible_employees_handler(
    State(app_state): State<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    let employees = app_state.employee_service.visible(&actor).await?;
    Ok(ApiResponse::success(employees))
}

pub fn organization_router(app_state: AppState) -> Router {
    Router::new()
        .route("/subsidiary-services", get(subsidiary_services_handler))
        .route(
            "/subsidiaries/{id}/services/attach",
            post(attach_service_handler),
        )
        .route(
            "/subsidiaries/{id}/services/detach",
            post(detach_service_handler),
        )
        .route("/subsidiaries/{id}/services", put(sync_services_handler))
        .route("/employees/visible", get(visible_employees_handler))
        .with_state(app_state)
}
