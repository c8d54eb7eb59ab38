// src/api/dto/report_dto.rs
use crate::domain::rollup::{minutes_to_hours, MinuteSplit};
use crate::types::{PaginatedResponse, PaginationQuery};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// サービス未指定のエントリーをまとめる行の表示名
pub const NO_SERVICE_LABEL: &str = "No service";

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub subsidiary_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ReportQuery {
    pub fn pagination(&self) -> (u64, u64) {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
        .get_pagination()
    }
}

// --- Response DTOs ---

/// 状態別の分数と時間
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MinutesDto {
    pub total_minutes: i64,
    pub approved_minutes: i64,
    pub submitted_minutes: i64,
    pub draft_minutes: i64,
    pub rejected_minutes: i64,
    pub pending_minutes: i64,
    pub total_hours: f64,
    pub approved_hours: f64,
    pub pending_hours: f64,
}

impl From<MinuteSplit> for MinutesDto {
    fn from(split: MinuteSplit) -> Self {
        Self {
            total_minutes: split.total,
            approved_minutes: split.approved,
            submitted_minutes: split.submitted,
            draft_minutes: split.draft,
            rejected_minutes: split.rejected,
            pending_minutes: split.pending(),
            total_hours: minutes_to_hours(split.total),
            approved_hours: minutes_to_hours(split.approved),
            pending_hours: minutes_to_hours(split.pending()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceBreakdownDto {
    pub service_id: Option<Uuid>,
    pub service_name: String,
    #[serde(flatten)]
    pub minutes: MinutesDto,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubsidiaryRollupDto {
    pub subsidiary_id: Uuid,
    pub subsidiary_name: String,
    #[serde(flatten)]
    pub minutes: MinutesDto,
    pub services: Vec<ServiceBreakdownDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubsidiaryCellDto {
    pub subsidiary_id: Uuid,
    pub subsidiary_name: String,
    #[serde(flatten)]
    pub minutes: MinutesDto,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceRollupDto {
    pub service_id: Option<Uuid>,
    pub service_name: String,
    #[serde(flatten)]
    pub minutes: MinutesDto,
    pub subsidiaries: Vec<SubsidiaryCellDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EmployeeRollupDto {
    pub employee_id: Uuid,
    pub employee_code: String,
    pub name: String,
    pub subsidiary_name: Option<String>,
    pub service_names: String,
    #[serde(flatten)]
    pub minutes: MinutesDto,
    pub subsidiaries: Vec<SubsidiaryRollupDto>,
}

/// 従業員 × 子会社 の表の1行
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReportTableRowDto {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub subsidiary_id: Uuid,
    pub subsidiary_name: String,
    pub total_minutes: i64,
    pub approved_minutes: i64,
    pub pending_minutes: i64,
    pub total_hours: f64,
    pub approved_hours: f64,
    pub pending_hours: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PersonalReportDto {
    pub employee_id: Uuid,
    pub totals: MinutesDto,
    pub by_subsidiary: Vec<SubsidiaryRollupDto>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReportResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub totals: MinutesDto,
    pub by_subsidiary: Vec<SubsidiaryRollupDto>,
    pub by_service: Vec<ServiceRollupDto>,
    pub employees: PaginatedResponse<EmployeeRollupDto>,
    pub table: Vec<ReportTableRowDto>,
    pub personal: Option<PersonalReportDto>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubsidiaryReportResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub totals: MinutesDto,
    pub subsidiaries: Vec<SubsidiaryRollupDto>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceReportResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub totals: MinutesDto,
    pub services: Vec<ServiceRollupDto>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EmployeeReportResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employees: PaginatedResponse<EmployeeRollupDto>,
}
