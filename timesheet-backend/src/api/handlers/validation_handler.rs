// src/api/handlers/validation_handler.rs
use crate::api::dto::validation_dto::{
    BulkApproveRequest, EmployeeEntriesQuery, RejectEntryRequest, ValidationQuery,
};
use crate::api::AppState;
use crate::domain::actor::Actor;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::types::ApiResponse;
use crate::utils::error_helper::convert_validation_errors;
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::info;
use validator::Validate;

pub async fn validation_index_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<ValidationQuery>,
) -> AppResult<impl IntoResponse> {
    let result = app_state.validation_service.index(&actor, query).await?;
    Ok(ApiResponse::success(result))
}

pub async fn employee_entries_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(employee_id): ValidatedUuid,
    Query(query): Query<EmployeeEntriesQuery>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .validation_service
        .show(&actor, employee_id, query)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn approve_entry_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let entry = app_state.validation_service.approve(&actor, id).await?;
    Ok(ApiResponse::success_with_message(entry, "Time entry approved"))
}

pub async fn reject_entry_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<RejectEntryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "validation_handler::reject"))?;

    let entry = app_state
        .validation_service
        .reject(&actor, id, &payload.reason)
        .await?;
    Ok(ApiResponse::success_with_message(entry, "Time entry rejected"))
}

pub async fn bulk_approve_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<BulkApproveRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "validation_handler::bulk_approve"))?;

    info!(
        user_id = %actor.user_id,
        requested = payload.entry_ids.len(),
        "Bulk approving time entries"
    );
    let result = app_state
        .validation_service
        .bulk_approve(&actor, &payload.entry_ids)
        .await?;
    let message = format!("{} entry(ies) approved", result.approved_count);
    Ok(ApiResponse::success_with_message(result, message))
}

pub fn validation_router(app_state: AppState) -> Router {
    Router::new()
        .route("/validation", get(validation_index_handler))
        .route("/validation/employees/{id}", get(employee_entries_handler))
        .route("/validation/bulk-approve", post(bulk_approve_handler))
        .route("/validation/{id}/approve", post(approve_entry_handler))
        .route("/validation/{id}/reject", post(reject_entry_handler))
        .with_state(app_state)
}
