// src/extractors/uuid.rs

use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// UUID セグメントの直前のセグメントからパラメータ名を推測する
fn param_name_for(path: &str) -> &'static str {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && Uuid::parse_str(segment).is_ok() {
            return match segments[i - 1] {
                "timesheet" | "validation" => "entry_id",
                "employees" => "employee_id",
                "subsidiaries" | "estimation" => "subsidiary_id",
                "notifications" => "notification_id",
                _ => "id",
            };
        }
    }
    "id"
}

/// 単一の UUID パスパラメータ
///
/// 形式が不正なら 400 を返す。
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidatedUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let param_name = param_name_for(parts.uri.path());

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::BadRequest(format!("Missing path parameter '{}': {}", param_name, e))
            })?;

        let uuid = Uuid::parse_str(&raw).map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid UUID format for '{}': '{}'",
                param_name, raw
            ))
        })?;

        Ok(ValidatedUuid(uuid))
    }
}
