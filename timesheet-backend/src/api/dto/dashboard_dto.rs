// src/api/dto/dashboard_dto.rs
use crate::api::dto::time_entry_dto::TimeEntryDto;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StatusCountsDto {
    pub draft: u64,
    pub submitted: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DayMinutesDto {
    pub date: NaiveDate,
    pub minutes: i64,
    pub hours: f64,
}

/// 従業員本人向けのブロック
#[derive(Serialize, Deserialize, Debug)]
pub struct EmployeeDashboardDto {
    pub week_minutes: i64,
    pub month_minutes: i64,
    pub last_month_minutes: i64,
    pub week_hours: f64,
    pub month_hours: f64,
    pub last_month_hours: f64,
    pub month_status_counts: StatusCountsDto,
    pub recent_entries: Vec<TimeEntryDto>,
    pub week: Vec<DayMinutesDto>,
}

/// マネージャー向けのブロック
#[derive(Serialize, Deserialize, Debug)]
pub struct ManagerDashboardDto {
    pub team_size: usize,
    pub pending_validations: u64,
    pub approved_this_week: u64,
    pub rejected_this_week: u64,
    pub latest_pending: Vec<TimeEntryDto>,
}

/// 管理者向けのブロック
#[derive(Serialize, Deserialize, Debug)]
pub struct AdminDashboardDto {
    pub active_employees: u64,
    pub users: u64,
    pub active_subsidiaries: u64,
    pub active_services: u64,
    pub entries_this_month: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DashboardResponse {
    pub today: NaiveDate,
    pub roles: Vec<String>,
    pub employee: Option<EmployeeDashboardDto>,
    pub manager: Option<ManagerDashboardDto>,
    pub admin: Option<AdminDashboardDto>,
}
