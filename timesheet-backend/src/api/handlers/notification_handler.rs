// src/api/handlers/notification_handler.rs
use crate::api::dto::notification_dto::{
    NotificationLimitQuery, DEFAULT_LIST_LIMIT, DEFAULT_UNREAD_LIMIT,
};
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::middleware::auth::AuthenticatedUser;
use crate::types::ApiResponse;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

pub async fn list_notifications_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<NotificationLimitQuery>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .notification_service
        .list(user.user_id, query.resolve(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn unread_notifications_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<NotificationLimitQuery>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .notification_service
        .unread(user.user_id, query.resolve(DEFAULT_UNREAD_LIMIT))
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn unread_count_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .notification_service
        .unread_count(user.user_id)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn mark_read_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .notification_service
        .mark_read(user.user_id, id)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn mark_all_read_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .notification_service
        .mark_all_read(user.user_id)
        .await?;
    Ok(ApiResponse::success(result))
}

pub fn notification_router(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/unread", get(unread_notifications_handler))
        .route("/notifications/count", get(unread_count_handler))
        .route("/notifications/read-all", post(mark_all_read_handler))
        .route("/notifications/{id}/read", post(mark_read_handler))
        .with_state(app_state)
}
