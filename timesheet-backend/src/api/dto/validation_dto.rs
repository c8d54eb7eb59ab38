// src/api/dto/validation_dto.rs
use crate::api::dto::time_entry_dto::{EmployeeSummaryDto, TimeEntryDto};
use crate::domain::time_entry_status::TimeEntryStatus;
use crate::types::PaginatedResponse;
use crate::utils::validation::{validate_month, validate_not_blank};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 承認画面の1ページあたりの件数
pub const VALIDATION_PAGE_SIZE: u64 = 10;

/// 承認画面の状態フィルタ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
    #[default]
    Submitted,
    Approved,
    Rejected,
    All,
}

impl StatusFilter {
    pub fn statuses(&self) -> Vec<TimeEntryStatus> {
        match self {
            Self::Submitted => vec![TimeEntryStatus::Submitted],
            Self::Approved => vec![TimeEntryStatus::Approved],
            Self::Rejected => vec![TimeEntryStatus::Rejected],
            Self::All => TimeEntryStatus::reviewed_or_pending(),
        }
    }
}

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
pub struct ValidationQuery {
    #[serde(default)]
    pub status: StatusFilter,
    pub page: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Validate)]
pub struct EmployeeEntriesQuery {
    #[validate(custom(function = validate_month))]
    pub month: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct RejectEntryRequest {
    #[validate(
        length(
            min = 1,
            max = 500,
            message = "Rejection reason must be between 1 and 500 characters"
        ),
        custom(function = validate_not_blank)
    )]
    pub reason: String,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct BulkApproveRequest {
    #[validate(length(min = 1, message = "At least one entry id is required"))]
    pub entry_ids: Vec<Uuid>,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReviewEmployeeDto {
    pub employee_id: Uuid,
    pub employee_code: String,
    pub name: String,
    pub email: Option<String>,
    pub entries_count: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ValidationIndexResponse {
    pub status: StatusFilter,
    #[serde(flatten)]
    pub employees: PaginatedResponse<ReviewEmployeeDto>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EmployeeEntriesResponse {
    pub month: String,
    pub employee: EmployeeSummaryDto,
    pub entries: Vec<TimeEntryDto>,
    pub total_minutes: i64,
    pub approved_minutes: i64,
    pub submitted_minutes: i64,
    pub total_hours: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BulkApproveResponse {
    pub approved_count: u64,
}
