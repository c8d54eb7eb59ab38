// src/api/dto/estimation_dto.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct EstimationQuery {
    /// 時給。省略時は 0
    pub rate: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubsidiaryEstimateSummaryDto {
    pub subsidiary_id: Uuid,
    pub subsidiary_code: String,
    pub subsidiary_name: String,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub employee_count: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EstimationIndexResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub subsidiaries: Vec<SubsidiaryEstimateSummaryDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EstimateLineDto {
    pub employee_id: Uuid,
    pub employee_code: String,
    pub name: String,
    pub minutes: i64,
    pub hours: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubsidiaryEstimateResponse {
    pub subsidiary_id: Uuid,
    pub subsidiary_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rate: f64,
    pub lines: Vec<EstimateLineDto>,
    pub total_hours: f64,
    pub total_amount: f64,
    pub employee_count: usize,
}
