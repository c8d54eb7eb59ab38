// src/api/handlers/timesheet_handler.rs
use crate::api::dto::time_entry_dto::{MonthQuery, SubmitEntriesRequest, TimeEntryRequest};
use crate::api::AppState;
use crate::domain::actor::Actor;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::types::ApiResponse;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tracing::info;

// --- 勤怠表 ---

pub async fn timesheet_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<MonthQuery>,
) -> AppResult<impl IntoResponse> {
    let timesheet = app_state
        .time_entry_service
        .timesheet(&actor, query)
        .await?;
    Ok(ApiResponse::success(timesheet))
}

// --- CRUD Handlers ---

pub async fn create_entry_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TimeEntryRequest>,
) -> AppResult<impl IntoResponse> {
    let entry = app_state.time_entry_service.create(&actor, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message(entry, "Time entry created"),
    ))
}

pub async fn update_entry_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<TimeEntryRequest>,
) -> AppResult<impl IntoResponse> {
    let entry = app_state
        .time_entry_service
        .update(&actor, id, payload)
        .await?;
    Ok(ApiResponse::success_with_message(entry, "Time entry updated"))
}

pub async fn delete_entry_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    app_state.time_entry_service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- 提出 ---

pub async fn submit_entries_handler(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<SubmitEntriesRequest>,
) -> AppResult<impl IntoResponse> {
    info!(
        user_id = %actor.user_id,
        requested = payload.entry_ids.len(),
        "Submitting time entries"
    );
    let result = app_state
        .time_entry_service
        .submit(&actor, &payload.entry_ids)
        .await?;
    let message = format!("{} entry(ies) submitted for review", result.submitted_count);
    Ok(ApiResponse::success_with_message(result, message))
}

pub fn timesheet_router(app_state: AppState) -> Router {
    Router::new()
        .route("/timesheet", get(timesheet_handler).post(create_entry_handler))
        .route("/timesheet/submit", post(submit_entries_handler))
        .route(
            "/timesheet/{id}",
            put(update_entry_handler).delete(delete_entry_handler),
        )
        .with_state(app_state)
}
