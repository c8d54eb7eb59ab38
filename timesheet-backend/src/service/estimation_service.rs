// src/service/estimation_service.rs

use crate::api::dto::estimation_dto::{
    EstimateLineDto, EstimationIndexResponse, EstimationQuery, SubsidiaryEstimateResponse,
    SubsidiaryEstimateSummaryDto,
};
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::domain::estimate::{estimate, is_valid_rate};
use crate::domain::rollup::{approved_by_employee, approved_subsidiary_summaries, minutes_to_hours};
use crate::domain::time_entry_status::TimeEntryStatus;
use crate::error::AppResult;
use crate::repository::employee_repository::EmployeeRepository;
use crate::repository::organization_repository::OrganizationRepository;
use crate::repository::time_entry_repository::{EntryScope, TimeEntryRepository};
use crate::service::report_service::resolve_range;
use crate::service::scope_service::ScopeService;
use crate::utils::error_helper::{forbidden_error, not_found_error, validation_error};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 承認済み時間からの費用見積もり
pub struct EstimationService {
    repo: Arc<TimeEntryRepository>,
    employee_repo: Arc<EmployeeRepository>,
    organization_repo: Arc<OrganizationRepository>,
    scope_service: Arc<ScopeService>,
}

impl EstimationService {
    pub fn new(db_pool: DbPool, scope_service: Arc<ScopeService>) -> Self {
        Self {
            repo: Arc::new(TimeEntryRepository::new(db_pool.clone())),
            employee_repo: Arc::new(EmployeeRepository::new(db_pool.clone())),
            organization_repo: Arc::new(OrganizationRepository::new(db_pool)),
            scope_service,
        }
    }

    /// 承認済み時間のある子会社の一覧（名前順）
    pub async fn index(
        &self,
        actor: &Actor,
        query: EstimationQuery,
    ) -> AppResult<EstimationIndexResponse> {
        ensure_estimator(actor, "estimation_service::index")?;
        let range = resolve_range(query.start_date, query.end_date)?;

        let visible = self.scope_service.managed_employee_ids(actor).await?;
        let scope = EntryScope {
            employee_ids: visible.into_iter().collect(),
            range: Some(range),
            statuses: vec![TimeEntryStatus::Approved],
            ..Default::default()
        };
        let facts = self.repo.find_facts(&scope).await?;
        let summaries = approved_subsidiary_summaries(&facts);

        let ids: Vec<Uuid> = summaries.iter().map(|s| s.subsidiary_id).collect();
        let mut subsidiaries: BTreeMap<Uuid, _> = self
            .organization_repo
            .find_subsidiaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut rows: Vec<SubsidiaryEstimateSummaryDto> = summaries
            .into_iter()
            .filter_map(|summary| {
                let subsidiary = subsidiaries.remove(&summary.subsidiary_id)?;
                Some(SubsidiaryEstimateSummaryDto {
                    subsidiary_id: subsidiary.id,
                    subsidiary_code: subsidiary.code,
                    subsidiary_name: subsidiary.name,
                    total_minutes: summary.approved_minutes,
                    total_hours: minutes_to_hours(summary.approved_minutes),
                    employee_count: summary.employee_count,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.subsidiary_name.cmp(&b.subsidiary_name));

        Ok(EstimationIndexResponse {
            start_date: range.start,
            end_date: range.end,
            subsidiaries: rows,
        })
    }

    /// 子会社1件の従業員別見積もり
    pub async fn subsidiary(
        &self,
        actor: &Actor,
        subsidiary_id: Uuid,
        query: EstimationQuery,
    ) -> AppResult<SubsidiaryEstimateResponse> {
        ensure_estimator(actor, "estimation_service::subsidiary")?;

        let rate = query.rate.unwrap_or(0.0);
        if !is_valid_rate(rate) {
            return Err(validation_error("rate", "Rate must be a non-negative number"));
        }
        let range = resolve_range(query.start_date, query.end_date)?;

        let subsidiary = self
            .organization_repo
            .find_subsidiary(subsidiary_id)
            .await?
            .ok_or_else(|| {
                not_found_error(
                    "Subsidiary",
                    &subsidiary_id.to_string(),
                    "estimation_service::subsidiary",
                )
            })?;

        let visible = self.scope_service.managed_employee_ids(actor).await?;
        let scope = EntryScope {
            employee_ids: visible.into_iter().collect(),
            range: Some(range),
            subsidiary_id: Some(subsidiary_id),
            statuses: vec![TimeEntryStatus::Approved],
            ..Default::default()
        };
        let facts = self.repo.find_facts(&scope).await?;
        let per_employee = approved_by_employee(&facts, subsidiary_id);

        let ids: Vec<Uuid> = per_employee.keys().copied().collect();
        let employees: BTreeMap<Uuid, _> = self
            .employee_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let result = estimate(per_employee, rate);
        let mut lines: Vec<EstimateLineDto> = result
            .lines
            .into_iter()
            .map(|line| {
                let (code, name) = employees
                    .get(&line.employee_id)
                    .map(|e| (e.employee_code.clone(), e.full_name()))
                    .unwrap_or_default();
                EstimateLineDto {
                    employee_id: line.employee_id,
                    employee_code: code,
                    name,
                    minutes: line.minutes,
                    hours: line.hours,
                    rate: line.rate,
                    amount: line.amount,
                }
            })
            .collect();
        lines.sort_by(|a, b| a.name.cmp(&b.name));

        info!(
            user_id = %actor.user_id,
            subsidiary_id = %subsidiary_id,
            employees = result.employee_count,
            rate,
            "Estimate computed"
        );

        Ok(SubsidiaryEstimateResponse {
            subsidiary_id: subsidiary.id,
            subsidiary_name: subsidiary.name,
            start_date: range.start,
            end_date: range.end,
            rate,
            lines,
            total_hours: result.total_hours,
            total_amount: result.total_amount,
            employee_count: result.employee_count,
        })
    }
}

fn ensure_estimator(actor: &Actor, context: &str) -> AppResult<()> {
    if actor.can_approve() {
        Ok(())
    } else {
        Err(forbidden_error(
            "Only managers and administrators can view estimates",
            context,
            Some(&actor.user_id.to_string()),
        ))
    }
}
