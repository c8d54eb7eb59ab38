// src/api/dto/time_entry_dto.rs
use crate::domain::rollup::minutes_to_hours;
use crate::domain::time_entry_model::{self, MAX_MINUTES, MIN_MINUTES};
use crate::domain::time_entry_status::TimeEntryStatus;
use crate::utils::validation::validate_month;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const NOTE_MAX_LENGTH: u64 = 1000;
pub const REQUESTER_MAX_LENGTH: u64 = 255;
pub const MAX_HOURS_FIELD: i32 = 24;
pub const MAX_MINUTES_FIELD: i32 = 59;

// --- Request DTOs ---

/// エントリーの作成・編集（編集は全項目の置き換え）
///
/// `minutes` のみ、または `hours` + `minutes` のどちらでも指定できる。
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct TimeEntryRequest {
    pub subsidiary_id: Uuid,
    pub service_id: Option<Uuid>,
    pub work_date: NaiveDate,

    #[validate(range(
        min = 0,
        max = 24,
        message = "Hours must be between 0 and 24"
    ))]
    pub hours: Option<i32>,

    pub minutes: Option<i32>,

    #[validate(length(
        max = NOTE_MAX_LENGTH,
        message = "Note must not exceed 1000 characters"
    ))]
    pub note: Option<String>,

    #[validate(length(
        max = REQUESTER_MAX_LENGTH,
        message = "Requester must not exceed 255 characters"
    ))]
    pub requester: Option<String>,
}

impl TimeEntryRequest {
    /// 入力を合計分数に正規化する
    pub fn total_minutes(&self) -> Result<i32, String> {
        let total = match self.hours {
            Some(hours) => {
                if !(0..=MAX_HOURS_FIELD).contains(&hours) {
                    return Err("Hours must be between 0 and 24".to_string());
                }
                let minutes = self.minutes.unwrap_or(0);
                if !(0..=MAX_MINUTES_FIELD).contains(&minutes) {
                    return Err("Minutes must be between 0 and 59 when hours are given".to_string());
                }
                hours * 60 + minutes
            }
            None => self
                .minutes
                .ok_or_else(|| "Either minutes or hours is required".to_string())?,
        };

        if !time_entry_model::is_valid_minutes(total) {
            return Err(format!(
                "Duration must be between {} and {} minutes",
                MIN_MINUTES, MAX_MINUTES
            ));
        }
        Ok(total)
    }

    /// 空白だけのメモは保存しない
    pub fn normalized_note(&self) -> Option<String> {
        normalize_text(self.note.as_deref())
    }

    pub fn normalized_requester(&self) -> Option<String> {
        normalize_text(self.requester.as_deref())
    }
}

fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct SubmitEntriesRequest {
    /// 空なら自分の DRAFT すべて
    #[serde(default)]
    pub entry_ids: Vec<Uuid>,
}

#[derive(Deserialize, Debug, Default, Validate)]
pub struct MonthQuery {
    #[validate(custom(function = validate_month))]
    pub month: Option<String>,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TimeEntryDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub subsidiary_id: Uuid,
    pub service_id: Option<Uuid>,
    pub work_date: NaiveDate,
    pub minutes: i32,
    pub hours: f64,
    pub note: Option<String>,
    pub requester: Option<String>,
    pub status: TimeEntryStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<time_entry_model::Model> for TimeEntryDto {
    fn from(model: time_entry_model::Model) -> Self {
        let status = model.get_status();
        Self {
            id: model.id,
            employee_id: model.employee_id,
            subsidiary_id: model.subsidiary_id,
            service_id: model.service_id,
            work_date: model.work_date,
            minutes: model.minutes,
            hours: minutes_to_hours(i64::from(model.minutes)),
            note: model.note,
            requester: model.requester,
            status,
            submitted_at: model.submitted_at,
            approved_at: model.approved_at,
            approved_by: model.approved_by,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// 入力フォームの選択肢
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OptionDto {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EmployeeSummaryDto {
    pub id: Uuid,
    pub employee_code: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TimesheetResponse {
    pub month: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee: EmployeeSummaryDto,
    pub entries: Vec<TimeEntryDto>,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub subsidiaries: Vec<OptionDto>,
    pub services: Vec<OptionDto>,
    pub roles: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubmitEntriesResponse {
    pub submitted_count: usize,
    pub entry_ids: Vec<Uuid>,
}
