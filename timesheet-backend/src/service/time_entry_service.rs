// src/service/time_entry_service.rs

use crate::api::dto::time_entry_dto::{
    EmployeeSummaryDto, MonthQuery, OptionDto, SubmitEntriesResponse, TimeEntryDto,
    TimeEntryRequest, TimesheetResponse,
};
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::domain::employee_model;
use crate::domain::entry_lifecycle::EntryState;
use crate::domain::period::DateRange;
use crate::domain::rollup::minutes_to_hours;
use crate::domain::time_entry_model::{self, ActiveModel as TimeEntryActiveModel};
use crate::error::{AppError, AppResult};
use crate::repository::employee_repository::EmployeeRepository;
use crate::repository::organization_repository::OrganizationRepository;
use crate::repository::time_entry_repository::TimeEntryRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::notification_service::NotificationService;
use crate::service::scope_service::ScopeService;
use crate::utils::error_helper::{
    convert_validation_errors, forbidden_error, not_found_error, validation_error,
};
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

/// 従業員本人の勤怠入力（作成・編集・削除・提出）
pub struct TimeEntryService {
    repo: Arc<TimeEntryRepository>,
    employee_repo: Arc<EmployeeRepository>,
    user_repo: Arc<UserRepository>,
    organization_repo: Arc<OrganizationRepository>,
    scope_service: Arc<ScopeService>,
    notification_service: Arc<NotificationService>,
}

/// DBの精度（マイクロ秒）に揃えた現在時刻
pub(crate) fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl TimeEntryService {
    pub fn new(
        db_pool: DbPool,
        scope_service: Arc<ScopeService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            repo: Arc::new(TimeEntryRepository::new(db_pool.clone())),
            employee_repo: Arc::new(EmployeeRepository::new(db_pool.clone())),
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            organization_repo: Arc::new(OrganizationRepository::new(db_pool)),
            scope_service,
            notification_service,
        }
    }

    /// 呼び出し元の従業員レコードを保証する
    ///
    /// 勤怠入力の経路でのみ呼ぶ。未紐付けなら作成して紐付ける。
    pub async fn ensure_employee(&self, actor: &Actor) -> AppResult<employee_model::Model> {
        if let Some(employee_id) = actor.employee_id {
            return self
                .employee_repo
                .find_by_id(employee_id)
                .await?
                .ok_or_else(|| {
                    not_found_error(
                        "Employee",
                        &employee_id.to_string(),
                        "time_entry_service::ensure_employee",
                    )
                });
        }

        let user = self
            .user_repo
            .find_by_id(actor.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
        let employee = self.employee_repo.ensure_for_user(&user).await?;

        info!(
            user_id = %actor.user_id,
            employee_id = %employee.id,
            employee_code = %employee.employee_code,
            "Linked employee record to user"
        );
        Ok(employee)
    }

    // --- 一覧 ---

    /// 月次の勤怠表と入力フォームの選択肢
    pub async fn timesheet(&self, actor: &Actor, query: MonthQuery) -> AppResult<TimesheetResponse> {
        query
            .validate()
            .map_err(|e| convert_validation_errors(e, "time_entry_service::timesheet"))?;

        let range = match query.month.as_deref() {
            Some(month) => {
                DateRange::parse_month(month).map_err(|e| validation_error("month", &e))?
            }
            None => DateRange::month_of(Utc::now().date_naive()),
        };

        let employee = self.ensure_employee(actor).await?;
        let entries = self
            .repo
            .find_for_employee_in_range(employee.id, range)
            .await?;

        let total_minutes: i64 = entries.iter().map(|e| i64::from(e.minutes)).sum();
        let subsidiaries = self
            .organization_repo
            .active_subsidiaries()
            .await?
            .into_iter()
            .map(|s| OptionDto {
                id: s.id,
                name: s.name,
            })
            .collect();
        let services = self
            .organization_repo
            .active_services()
            .await?
            .into_iter()
            .map(|s| OptionDto {
                id: s.id,
                name: s.name,
            })
            .collect();

        Ok(TimesheetResponse {
            month: range.month_label(),
            start_date: range.start,
            end_date: range.end,
            employee: employee_summary(&employee),
            entries: entries.into_iter().map(Into::into).collect(),
            total_minutes,
            total_hours: minutes_to_hours(total_minutes),
            subsidiaries,
            services,
            roles: actor.roles.names().into_iter().map(str::to_string).collect(),
        })
    }

    // --- CRUD ---

    /// エントリーを作成する。MANAGER / ADMIN は即時承認
    pub async fn create(&self, actor: &Actor, payload: TimeEntryRequest) -> AppResult<TimeEntryDto> {
        let minutes = self.validate_payload(&payload).await?;
        let employee = self.ensure_employee(actor).await?;

        let now = db_now();
        let state = EntryState::on_create(&actor.roles, actor.user_id, now);

        let mut entry = TimeEntryActiveModel {
            employee_id: Set(employee.id),
            subsidiary_id: Set(payload.subsidiary_id),
            service_id: Set(payload.service_id),
            work_date: Set(payload.work_date),
            minutes: Set(minutes),
            note: Set(payload.normalized_note()),
            requester: Set(payload.normalized_requester()),
            ..Default::default()
        };
        entry.apply_state(&state);

        let created = self.repo.insert(entry).await?;
        info!(
            user_id = %actor.user_id,
            entry_id = %created.id,
            status = %created.status,
            minutes = created.minutes,
            "Time entry created"
        );
        Ok(created.into())
    }

    /// 本人による編集。DRAFT / REJECTED のみ可
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: TimeEntryRequest,
    ) -> AppResult<TimeEntryDto> {
        let entry = self.find_owned(actor, id, "time_entry_service::update").await?;

        let now = db_now();
        let next = entry.state()?.edit(&actor.roles, actor.user_id, now)?;
        let minutes = self.validate_payload(&payload).await?;

        let mut changes = <TimeEntryActiveModel as ActiveModelTrait>::default();
        changes.subsidiary_id = Set(payload.subsidiary_id);
        changes.service_id = Set(payload.service_id);
        changes.work_date = Set(payload.work_date);
        changes.minutes = Set(minutes);
        changes.note = Set(payload.normalized_note());
        changes.requester = Set(payload.normalized_requester());
        changes.apply_state(&next);

        let current_status = entry.get_status();
        let Some(updated) = self.repo.update_if_status(id, current_status, changes).await? else {
            return Err(self.locked_error(id).await);
        };

        info!(
            user_id = %actor.user_id,
            entry_id = %id,
            from = %current_status,
            to = %updated.status,
            "Time entry updated"
        );
        Ok(updated.into())
    }

    /// 本人による削除。DRAFT のみ可
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let entry = self.find_owned(actor, id, "time_entry_service::delete").await?;
        entry.state()?.ensure_deletable()?;

        if !self.repo.delete_if_draft(id).await? {
            return Err(self.locked_error(id).await);
        }

        info!(user_id = %actor.user_id, entry_id = %id, "Time entry deleted");
        Ok(())
    }

    // --- 提出 ---

    /// 下書きを一括提出する
    ///
    /// `entry_ids` が空なら自分の DRAFT すべて。対象外のIDは黙って無視する。
    pub async fn submit(&self, actor: &Actor, entry_ids: &[Uuid]) -> AppResult<SubmitEntriesResponse> {
        let Some(employee_id) = actor.employee_id else {
            return Err(AppError::NoEntries("No draft entries to submit".to_string()));
        };

        let submitted = self
            .repo
            .submit_drafts(employee_id, entry_ids, db_now())
            .await?;

        if submitted.is_empty() {
            return Err(AppError::NoEntries("No draft entries to submit".to_string()));
        }

        info!(
            user_id = %actor.user_id,
            employee_id = %employee_id,
            submitted = submitted.len(),
            "Time entries submitted"
        );

        self.notify_submission(employee_id, &submitted).await;

        Ok(SubmitEntriesResponse {
            submitted_count: submitted.len(),
            entry_ids: submitted.iter().map(|e| e.id).collect(),
        })
    }

    /// 提出者の通知先へ1回だけ通知する。失敗は記録のみ
    async fn notify_submission(&self, employee_id: Uuid, submitted: &[time_entry_model::Model]) {
        let employee = match self.employee_repo.find_by_id(employee_id).await {
            Ok(Some(employee)) => employee,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, employee_id = %employee_id, "Failed to load submitter");
                return;
            }
        };

        let audience = match self.scope_service.submission_audience(employee_id).await {
            Ok(audience) => audience,
            Err(e) => {
                error!(error = %e, employee_id = %employee_id, "Failed to resolve audience");
                return;
            }
        };

        let sent = self
            .notification_service
            .notify_submitted(&employee, submitted, &audience)
            .await;
        info!(
            employee_id = %employee_id,
            recipients = audience.len(),
            notifications = sent,
            "Submission notifications dispatched"
        );
    }

    // --- helpers ---

    async fn validate_payload(&self, payload: &TimeEntryRequest) -> AppResult<i32> {
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "time_entry_service::validate_payload"))?;

        let minutes = payload
            .total_minutes()
            .map_err(|message| validation_error("minutes", &message))?;

        if self
            .organization_repo
            .find_subsidiary(payload.subsidiary_id)
            .await?
            .is_none()
        {
            return Err(validation_error("subsidiary_id", "Subsidiary does not exist"));
        }

        if let Some(service_id) = payload.service_id {
            if self.organization_repo.find_service(service_id).await?.is_none() {
                return Err(validation_error("service_id", "Service does not exist"));
            }
        }

        Ok(minutes)
    }

    /// 本人のエントリーを取得する
    async fn find_owned(
        &self,
        actor: &Actor,
        id: Uuid,
        context: &str,
    ) -> AppResult<time_entry_model::Model> {
        if actor.employee_id.is_none() {
            return Err(forbidden_error(
                "No employee record is linked to this account",
                context,
                Some(&actor.user_id.to_string()),
            ));
        }

        let entry = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("TimeEntry", &id.to_string(), context))?;

        if !actor.owns(entry.employee_id) {
            return Err(forbidden_error(
                "You can only modify your own time entries",
                context,
                Some(&actor.user_id.to_string()),
            ));
        }
        Ok(entry)
    }

    /// 条件付き更新が競合で空振りした時のエラー
    async fn locked_error(&self, id: Uuid) -> AppError {
        match self.repo.find_by_id(id).await {
            Ok(Some(current)) => AppError::EntryLocked {
                status: current.get_status(),
            },
            Ok(None) => AppError::NotFound(format!("TimeEntry with identifier {} not found", id)),
            Err(e) => e.into(),
        }
    }
}

pub(crate) fn employee_summary(employee: &employee_model::Model) -> EmployeeSummaryDto {
    EmployeeSummaryDto {
        id: employee.id,
        employee_code: employee.employee_code.clone(),
        name: employee.full_name(),
        email: employee.email.clone(),
    }
}
