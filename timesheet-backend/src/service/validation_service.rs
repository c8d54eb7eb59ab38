// src/service/validation_service.rs

use crate::api::dto::time_entry_dto::TimeEntryDto;
use crate::api::dto::validation_dto::{
    BulkApproveResponse, EmployeeEntriesQuery, EmployeeEntriesResponse, ReviewEmployeeDto,
    ValidationIndexResponse, ValidationQuery, VALIDATION_PAGE_SIZE,
};
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::domain::entry_lifecycle::normalize_rejection_reason;
use crate::domain::period::DateRange;
use crate::domain::rollup::{flat_total, minutes_to_hours};
use crate::domain::time_entry_model::{self, ActiveModel as TimeEntryActiveModel};
use crate::domain::time_entry_status::TimeEntryStatus;
use crate::error::{AppError, AppResult};
use crate::repository::employee_repository::EmployeeRepository;
use crate::repository::time_entry_repository::{EntryScope, TimeEntryRepository};
use crate::service::notification_service::NotificationService;
use crate::service::scope_service::ScopeService;
use crate::service::time_entry_service::{db_now, employee_summary};
use crate::types::pagination::{page_offset, MAX_PAGE};
use crate::types::PaginatedResponse;
use crate::utils::error_helper::{
    convert_validation_errors, forbidden_error, not_found_error, validation_error,
};
use chrono::Utc;
use sea_orm::ActiveModelTrait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

/// 提出済みエントリーの審査（承認・却下）
pub struct ValidationService {
    repo: Arc<TimeEntryRepository>,
    employee_repo: Arc<EmployeeRepository>,
    scope_service: Arc<ScopeService>,
    notification_service: Arc<NotificationService>,
}

impl ValidationService {
    pub fn new(
        db_pool: DbPool,
        scope_service: Arc<ScopeService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            repo: Arc::new(TimeEntryRepository::new(db_pool.clone())),
            employee_repo: Arc::new(EmployeeRepository::new(db_pool)),
            scope_service,
            notification_service,
        }
    }

    // --- 一覧 ---

    /// 指定状態のエントリーを持つ管理下の従業員
    pub async fn index(
        &self,
        actor: &Actor,
        query: ValidationQuery,
    ) -> AppResult<ValidationIndexResponse> {
        ensure_reviewer(actor, "validation_service::index")?;

        let managed = self.scope_service.managed_employee_ids(actor).await?;
        let scope = EntryScope {
            employee_ids: managed.into_iter().collect(),
            statuses: query.status.statuses(),
            ..Default::default()
        };
        let counts = self.repo.count_by_employee(&scope).await?;

        let owner_ids: Vec<Uuid> = counts.keys().copied().collect();
        let employees = self.employee_repo.find_by_ids(&owner_ids).await?;

        let page = query.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let total = employees.len() as u64;
        let skip = usize::try_from(page_offset(page, VALIDATION_PAGE_SIZE)).unwrap_or(usize::MAX);
        let rows = employees
            .into_iter()
            .skip(skip)
            .take(VALIDATION_PAGE_SIZE as usize)
            .map(|employee| ReviewEmployeeDto {
                entries_count: counts.get(&employee.id).copied().unwrap_or(0),
                employee_id: employee.id,
                name: employee.full_name(),
                employee_code: employee.employee_code,
                email: employee.email,
            })
            .collect();

        Ok(ValidationIndexResponse {
            status: query.status,
            employees: PaginatedResponse::new(rows, page, VALIDATION_PAGE_SIZE, total),
        })
    }

    /// 管理下の従業員1人の月次エントリー
    pub async fn show(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        query: EmployeeEntriesQuery,
    ) -> AppResult<EmployeeEntriesResponse> {
        ensure_reviewer(actor, "validation_service::show")?;
        query
            .validate()
            .map_err(|e| convert_validation_errors(e, "validation_service::show"))?;

        let managed = self.scope_service.managed_employee_ids(actor).await?;
        if !managed.contains(&employee_id) {
            return Err(forbidden_error(
                "This employee is outside your scope",
                "validation_service::show",
                Some(&actor.user_id.to_string()),
            ));
        }

        let employee = self
            .employee_repo
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| {
                not_found_error("Employee", &employee_id.to_string(), "validation_service::show")
            })?;

        let range = match query.month.as_deref() {
            Some(month) => {
                DateRange::parse_month(month).map_err(|e| validation_error("month", &e))?
            }
            None => DateRange::month_of(Utc::now().date_naive()),
        };

        let entries = self
            .repo
            .find_for_employee_in_range(employee_id, range)
            .await?;
        let facts: Vec<_> = entries.iter().map(time_entry_model::Model::fact).collect();
        let split = flat_total(&facts);

        Ok(EmployeeEntriesResponse {
            month: range.month_label(),
            employee: employee_summary(&employee),
            entries: entries.into_iter().map(Into::into).collect(),
            total_minutes: split.total,
            approved_minutes: split.approved,
            submitted_minutes: split.submitted,
            total_hours: minutes_to_hours(split.total),
        })
    }

    // --- 審査 ---

    /// 1件承認する
    pub async fn approve(&self, actor: &Actor, id: Uuid) -> AppResult<TimeEntryDto> {
        ensure_reviewer(actor, "validation_service::approve")?;
        let entry = self.find_entry(id, "validation_service::approve").await?;
        self.scope_service
            .authorize_review(actor, entry.employee_id)
            .await?;

        let next = entry.state()?.approve(actor.user_id, db_now())?;
        let mut changes = <TimeEntryActiveModel as ActiveModelTrait>::default();
        changes.apply_state(&next);

        let Some(approved) = self
            .repo
            .update_if_status(id, TimeEntryStatus::Submitted, changes)
            .await?
        else {
            return Err(self.transition_error(id, TimeEntryStatus::Approved).await);
        };

        info!(
            user_id = %actor.user_id,
            entry_id = %id,
            employee_id = %approved.employee_id,
            "Time entry approved"
        );

        let approver_name = self.reviewer_name(actor).await;
        self.notify_owner_approved(approved.employee_id, std::slice::from_ref(&approved), &approver_name)
            .await;

        Ok(approved.into())
    }

    /// 1件却下する。理由は状態を変える前に検証する
    pub async fn reject(&self, actor: &Actor, id: Uuid, reason: &str) -> AppResult<TimeEntryDto> {
        let reason = normalize_rejection_reason(reason).ok_or_else(|| {
            validation_error(
                "reason",
                "Rejection reason is required and must not exceed 500 characters",
            )
        })?;

        ensure_reviewer(actor, "validation_service::reject")?;
        let entry = self.find_entry(id, "validation_service::reject").await?;
        self.scope_service
            .authorize_review(actor, entry.employee_id)
            .await?;

        let next = entry.state()?.reject(reason.clone())?;
        let mut changes = <TimeEntryActiveModel as ActiveModelTrait>::default();
        changes.apply_state(&next);

        let Some(rejected) = self
            .repo
            .update_if_status(id, TimeEntryStatus::Submitted, changes)
            .await?
        else {
            return Err(self.transition_error(id, TimeEntryStatus::Rejected).await);
        };

        info!(
            user_id = %actor.user_id,
            entry_id = %id,
            employee_id = %rejected.employee_id,
            "Time entry rejected"
        );

        let reviewer_name = self.reviewer_name(actor).await;
        match self.scope_service.user_of_employee(rejected.employee_id).await {
            Ok(Some(owner)) => {
                self.notification_service
                    .notify_rejected(&owner, &rejected, &reviewer_name, &reason)
                    .await;
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, entry_id = %id, "Failed to resolve entry owner"),
        }

        Ok(rejected.into())
    }

    /// 一括承認する
    ///
    /// SUBMITTED かつ審査権限のあるIDだけを対象にし、条件付きの1回の更新で承認する。
    /// 戻り値の件数はこの呼び出しで実際に更新した行数。
    pub async fn bulk_approve(
        &self,
        actor: &Actor,
        entry_ids: &[Uuid],
    ) -> AppResult<BulkApproveResponse> {
        ensure_reviewer(actor, "validation_service::bulk_approve")?;
        if entry_ids.is_empty() {
            return Err(validation_error("entry_ids", "At least one entry id is required"));
        }

        let candidates: Vec<time_entry_model::Model> = self
            .repo
            .find_by_ids(entry_ids)
            .await?
            .into_iter()
            .filter(|e| e.get_status().is_awaiting_review())
            .collect();

        let owners: BTreeSet<Uuid> = candidates.iter().map(|e| e.employee_id).collect();
        let allowed = self.scope_service.reviewable_owners(actor, &owners).await?;
        let eligible: Vec<Uuid> = candidates
            .iter()
            .filter(|e| allowed.contains(&e.employee_id))
            .map(|e| e.id)
            .collect();

        let (approved_count, approved) = self
            .repo
            .approve_submitted(&eligible, actor.user_id, db_now())
            .await?;

        info!(
            user_id = %actor.user_id,
            requested = entry_ids.len(),
            eligible = eligible.len(),
            approved = approved_count,
            "Bulk approval finished"
        );

        if !approved.is_empty() {
            let mut per_owner: BTreeMap<Uuid, Vec<time_entry_model::Model>> = BTreeMap::new();
            for entry in approved {
                per_owner.entry(entry.employee_id).or_default().push(entry);
            }

            let approver_name = self.reviewer_name(actor).await;
            for (employee_id, entries) in per_owner {
                self.notify_owner_approved(employee_id, &entries, &approver_name)
                    .await;
            }
        }

        Ok(BulkApproveResponse { approved_count })
    }

    // --- helpers ---

    async fn find_entry(&self, id: Uuid, context: &str) -> AppResult<time_entry_model::Model> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("TimeEntry", &id.to_string(), context))
    }

    /// 条件付き更新が空振りした時、現在の状態から遷移エラーを作る
    async fn transition_error(&self, id: Uuid, to: TimeEntryStatus) -> AppError {
        match self.repo.find_by_id(id).await {
            Ok(Some(current)) => AppError::InvalidTransition {
                from: current.get_status(),
                to,
            },
            Ok(None) => AppError::NotFound(format!("TimeEntry with identifier {} not found", id)),
            Err(e) => e.into(),
        }
    }

    /// 通知に表示する審査者名。従業員の氏名、なければメールアドレス
    async fn reviewer_name(&self, actor: &Actor) -> String {
        if let Some(employee_id) = actor.employee_id {
            if let Ok(Some(employee)) = self.employee_repo.find_by_id(employee_id).await {
                let name = employee.full_name();
                if !name.is_empty() {
                    return name;
                }
            }
        }
        actor.email.clone()
    }

    async fn notify_owner_approved(
        &self,
        employee_id: Uuid,
        entries: &[time_entry_model::Model],
        approver_name: &str,
    ) {
        match self.scope_service.user_of_employee(employee_id).await {
            Ok(Some(owner)) => {
                self.notification_service
                    .notify_approved(&owner, entries, approver_name)
                    .await;
            }
            Ok(None) => {}
            Err(e) => error!(
                error = %e,
                employee_id = %employee_id,
                "Failed to resolve entry owner"
            ),
        }
    }
}

fn ensure_reviewer(actor: &Actor, context: &str) -> AppResult<()> {
    if actor.can_approve() {
        Ok(())
    } else {
        Err(forbidden_error(
            "Only managers and administrators can review time",
            context,
            Some(&actor.user_id.to_string()),
        ))
    }
}
