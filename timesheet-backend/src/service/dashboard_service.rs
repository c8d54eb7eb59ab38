// src/service/dashboard_service.rs

use crate::api::dto::dashboard_dto::{
    AdminDashboardDto, DashboardResponse, DayMinutesDto, EmployeeDashboardDto,
    ManagerDashboardDto, StatusCountsDto,
};
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::domain::period::DateRange;
use crate::domain::rollup::{by_day, flat_total, minutes_to_hours};
use crate::domain::time_entry_status::TimeEntryStatus;
use crate::error::AppResult;
use crate::repository::employee_repository::EmployeeRepository;
use crate::repository::organization_repository::OrganizationRepository;
use crate::repository::time_entry_repository::{EntryScope, TimeEntryRepository};
use crate::repository::user_repository::UserRepository;
use crate::service::scope_service::ScopeService;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

const RECENT_ENTRIES: u64 = 5;
const LATEST_PENDING: u64 = 5;

/// ロールに応じたダッシュボード
pub struct DashboardService {
    repo: Arc<TimeEntryRepository>,
    employee_repo: Arc<EmployeeRepository>,
    user_repo: Arc<UserRepository>,
    organization_repo: Arc<OrganizationRepository>,
    scope_service: Arc<ScopeService>,
}

impl DashboardService {
    pub fn new(db_pool: DbPool, scope_service: Arc<ScopeService>) -> Self {
        Self {
            repo: Arc::new(TimeEntryRepository::new(db_pool.clone())),
            employee_repo: Arc::new(EmployeeRepository::new(db_pool.clone())),
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            organization_repo: Arc::new(OrganizationRepository::new(db_pool)),
            scope_service,
        }
    }

    pub async fn dashboard(&self, actor: &Actor) -> AppResult<DashboardResponse> {
        self.dashboard_on(actor, Utc::now().date_naive()).await
    }

    /// 基準日を指定して組み立てる
    pub async fn dashboard_on(&self, actor: &Actor, today: NaiveDate) -> AppResult<DashboardResponse> {
        let employee = match actor.employee_id {
            Some(employee_id) => Some(self.employee_block(employee_id, today).await?),
            None => None,
        };
        let manager = if actor.can_approve() {
            Some(self.manager_block(actor, today).await?)
        } else {
            None
        };
        let admin = if actor.is_admin() {
            Some(self.admin_block(today).await?)
        } else {
            None
        };

        Ok(DashboardResponse {
            today,
            roles: actor.roles.names().into_iter().map(str::to_string).collect(),
            employee,
            manager,
            admin,
        })
    }

    async fn employee_block(&self, employee_id: Uuid, today: NaiveDate) -> AppResult<EmployeeDashboardDto> {
        let week = DateRange::week_of(today);
        let month = DateRange::month_of(today);
        let last_month = DateRange::previous_month_of(today);

        let week_facts = self
            .repo
            .find_facts(&EntryScope::new(vec![employee_id], week))
            .await?;
        let month_facts = self
            .repo
            .find_facts(&EntryScope::new(vec![employee_id], month))
            .await?;
        let last_month_facts = self
            .repo
            .find_facts(&EntryScope::new(vec![employee_id], last_month))
            .await?;

        let week_minutes = flat_total(&week_facts).total;
        let month_split = flat_total(&month_facts);
        let last_month_minutes = flat_total(&last_month_facts).total;

        let mut counts = StatusCountsDto::default();
        for fact in &month_facts {
            match fact.status {
                TimeEntryStatus::Draft => counts.draft += 1,
                TimeEntryStatus::Submitted => counts.submitted += 1,
                TimeEntryStatus::Approved => counts.approved += 1,
                TimeEntryStatus::Rejected => counts.rejected += 1,
            }
        }

        let per_day = by_day(&week_facts);
        let week_strip = week
            .days()
            .into_iter()
            .map(|date| {
                let minutes = per_day.get(&date).copied().unwrap_or(0);
                DayMinutesDto {
                    date,
                    minutes,
                    hours: minutes_to_hours(minutes),
                }
            })
            .collect();

        let recent = self
            .repo
            .find_recent_for_employee(employee_id, RECENT_ENTRIES)
            .await?;

        Ok(EmployeeDashboardDto {
            week_minutes,
            month_minutes: month_split.total,
            last_month_minutes,
            week_hours: minutes_to_hours(week_minutes),
            month_hours: minutes_to_hours(month_split.total),
            last_month_hours: minutes_to_hours(last_month_minutes),
            month_status_counts: counts,
            recent_entries: recent.into_iter().map(Into::into).collect(),
            week: week_strip,
        })
    }

    async fn manager_block(&self, actor: &Actor, today: NaiveDate) -> AppResult<ManagerDashboardDto> {
        let team: Vec<Uuid> = self
            .scope_service
            .managed_employee_ids(actor)
            .await?
            .into_iter()
            .collect();

        let week = DateRange::week_of(today);
        let (from, to) = utc_bounds(week);

        let pending_validations = self
            .repo
            .count_with_status(&team, TimeEntryStatus::Submitted)
            .await?;
        let approved_this_week = self.repo.count_approved_between(&team, from, to).await?;
        let rejected_this_week = self.repo.count_rejected_between(&team, from, to).await?;
        let latest_pending = self.repo.find_pending(&team, LATEST_PENDING).await?;

        Ok(ManagerDashboardDto {
            team_size: team.len(),
            pending_validations,
            approved_this_week,
            rejected_this_week,
            latest_pending: latest_pending.into_iter().map(Into::into).collect(),
        })
    }

    async fn admin_block(&self, today: NaiveDate) -> AppResult<AdminDashboardDto> {
        Ok(AdminDashboardDto {
            active_employees: self.employee_repo.count_active().await?,
            users: self.user_repo.count_all().await?,
            active_subsidiaries: self.organization_repo.count_active_subsidiaries().await?,
            active_services: self.organization_repo.count_active_services().await?,
            entries_this_month: self
                .repo
                .count_in_range(DateRange::month_of(today))
                .await?,
        })
    }
}

/// 日付範囲を UTC の半開区間 [from, to) に変換する
fn utc_bounds(range: DateRange) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = range.start.and_time(chrono::NaiveTime::MIN).and_utc();
    let to = (range.end + Duration::days(1))
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    (from, to)
}
