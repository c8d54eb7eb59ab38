// src/service/report_service.rs

use crate::api::dto::report_dto::{
    EmployeeReportResponse, EmployeeRollupDto, MinutesDto, PersonalReportDto, ReportQuery,
    ReportResponse, ReportTableRowDto, ServiceBreakdownDto, ServiceReportResponse,
    ServiceRollupDto, SubsidiaryCellDto, SubsidiaryReportResponse, SubsidiaryRollupDto,
    NO_SERVICE_LABEL,
};
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::domain::period::DateRange;
use crate::domain::rollup::{
    by_employee, by_employee_subsidiary, by_service, by_subsidiary, minutes_to_hours, EntryFact,
    MinuteSplit, ServiceRollup, SubsidiaryBucket,
};
use crate::error::AppResult;
use crate::repository::employee_repository::EmployeeRepository;
use crate::repository::membership_repository::MembershipRepository;
use crate::repository::organization_repository::OrganizationRepository;
use crate::repository::time_entry_repository::{EntryScope, TimeEntryRepository};
use crate::service::scope_service::ScopeService;
use crate::types::PaginatedResponse;
use crate::utils::error_helper::validation_error;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 集計のための名前解決表
#[derive(Default)]
struct NameBook {
    subsidiaries: BTreeMap<Uuid, String>,
    services: BTreeMap<Uuid, String>,
}

impl NameBook {
    fn subsidiary(&self, id: Uuid) -> String {
        self.subsidiaries
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn service(&self, id: Option<Uuid>) -> String {
        match id {
            Some(id) => self
                .services
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => NO_SERVICE_LABEL.to_string(),
        }
    }
}

/// 期間・範囲を指定した時間集計
pub struct ReportService {
    repo: Arc<TimeEntryRepository>,
    employee_repo: Arc<EmployeeRepository>,
    membership_repo: Arc<MembershipRepository>,
    organization_repo: Arc<OrganizationRepository>,
    scope_service: Arc<ScopeService>,
}

impl ReportService {
    pub fn new(db_pool: DbPool, scope_service: Arc<ScopeService>) -> Self {
        Self {
            repo: Arc::new(TimeEntryRepository::new(db_pool.clone())),
            employee_repo: Arc::new(EmployeeRepository::new(db_pool.clone())),
            membership_repo: Arc::new(MembershipRepository::new(db_pool.clone())),
            organization_repo: Arc::new(OrganizationRepository::new(db_pool)),
            scope_service,
        }
    }

    /// 全セクションをまとめたレポート
    ///
    /// 各セクションは同じ1回の取得結果から計算する。
    pub async fn full_report(&self, actor: &Actor, query: ReportQuery) -> AppResult<ReportResponse> {
        let (range, scope) = self.scope_for(actor, &query).await?;
        let facts = self.repo.find_facts(&scope).await?;
        let names = self.name_book(&facts).await?;

        let subsidiary_buckets = by_subsidiary(&facts);
        let totals = sum_buckets(&subsidiary_buckets);
        let by_subsidiary = subsidiary_dtos(subsidiary_buckets, &names);
        let by_service = service_dtos(by_service(&facts), &names);
        let employees = self.employee_page(&scope, &facts, &query, &names).await?;
        let table = self.table_rows(&facts, &names).await?;
        let personal = self.personal(actor, range, &query).await?;

        info!(
            user_id = %actor.user_id,
            start_date = %range.start,
            end_date = %range.end,
            visible_employees = scope.employee_ids.len(),
            entries = facts.len(),
            "Report generated"
        );

        Ok(ReportResponse {
            start_date: range.start,
            end_date: range.end,
            totals: totals.into(),
            by_subsidiary,
            by_service,
            employees,
            table,
            personal,
        })
    }

    pub async fn subsidiaries(
        &self,
        actor: &Actor,
        query: ReportQuery,
    ) -> AppResult<SubsidiaryReportResponse> {
        let (range, scope) = self.scope_for(actor, &query).await?;
        let facts = self.repo.find_facts(&scope).await?;
        let names = self.name_book(&facts).await?;

        let buckets = by_subsidiary(&facts);
        let totals = sum_buckets(&buckets);

        Ok(SubsidiaryReportResponse {
            start_date: range.start,
            end_date: range.end,
            totals: totals.into(),
            subsidiaries: subsidiary_dtos(buckets, &names),
        })
    }

    pub async fn services(
        &self,
        actor: &Actor,
        query: ReportQuery,
    ) -> AppResult<ServiceReportResponse> {
        let (range, scope) = self.scope_for(actor, &query).await?;
        let facts = self.repo.find_facts(&scope).await?;
        let names = self.name_book(&facts).await?;

        let rollups = by_service(&facts);
        let mut totals = MinuteSplit::default();
        for rollup in &rollups {
            totals += rollup.minutes;
        }

        Ok(ServiceReportResponse {
            start_date: range.start,
            end_date: range.end,
            totals: totals.into(),
            services: service_dtos(rollups, &names),
        })
    }

    pub async fn employees(
        &self,
        actor: &Actor,
        query: ReportQuery,
    ) -> AppResult<EmployeeReportResponse> {
        let (range, scope) = self.scope_for(actor, &query).await?;
        let facts = self.repo.find_facts(&scope).await?;
        let names = self.name_book(&facts).await?;

        Ok(EmployeeReportResponse {
            start_date: range.start,
            end_date: range.end,
            employees: self.employee_page(&scope, &facts, &query, &names).await?,
        })
    }

    // --- helpers ---

    /// 期間と閲覧範囲から抽出条件を作る
    async fn scope_for(&self, actor: &Actor, query: &ReportQuery) -> AppResult<(DateRange, EntryScope)> {
        let range = resolve_range(query.start_date, query.end_date)?;
        let visible = self.scope_service.visible_employee_ids(actor).await?;

        let scope = EntryScope {
            employee_ids: visible.into_iter().collect(),
            range: Some(range),
            subsidiary_id: query.subsidiary_id,
            employee_id: query.employee_id,
            statuses: Vec::new(),
        };
        Ok((range, scope))
    }

    async fn name_book(&self, facts: &[EntryFact]) -> AppResult<NameBook> {
        let subsidiary_ids: BTreeSet<Uuid> = facts.iter().map(|f| f.subsidiary_id).collect();
        let service_ids: BTreeSet<Uuid> = facts.iter().filter_map(|f| f.service_id).collect();

        let subsidiaries = self
            .organization_repo
            .find_subsidiaries(&subsidiary_ids.into_iter().collect::<Vec<_>>())
            .await?;
        let services = self
            .organization_repo
            .find_services(&service_ids.into_iter().collect::<Vec<_>>())
            .await?;

        Ok(NameBook {
            subsidiaries: subsidiaries.into_iter().map(|s| (s.id, s.name)).collect(),
            services: services.into_iter().map(|s| (s.id, s.name)).collect(),
        })
    }

    /// 検索・ページング付きの従業員別集計
    async fn employee_page(
        &self,
        scope: &EntryScope,
        facts: &[EntryFact],
        query: &ReportQuery,
        names: &NameBook,
    ) -> AppResult<PaginatedResponse<EmployeeRollupDto>> {
        let (page, per_page) = query.pagination();

        let candidates: Vec<Uuid> = match query.employee_id {
            Some(employee_id) => scope
                .employee_ids
                .iter()
                .copied()
                .filter(|id| *id == employee_id)
                .collect(),
            None => scope.employee_ids.clone(),
        };

        let (employees, total) = self
            .employee_repo
            .search(&candidates, query.search.as_deref(), page, per_page)
            .await?;

        let page_ids: BTreeSet<Uuid> = employees.iter().map(|e| e.id).collect();
        let page_facts: Vec<EntryFact> = facts
            .iter()
            .filter(|f| page_ids.contains(&f.employee_id))
            .cloned()
            .collect();
        let mut buckets = by_employee(&page_facts, &page_ids);

        let id_list: Vec<Uuid> = page_ids.iter().copied().collect();
        let mut service_names = self
            .membership_repo
            .service_names_by_employee(&id_list)
            .await?;
        let mut display_subsidiaries = self
            .membership_repo
            .display_subsidiary_by_employee(&id_list)
            .await?;

        let rows = employees
            .into_iter()
            .map(|employee| {
                let bucket = buckets.remove(&employee.id);
                let (minutes, subsidiaries) = match bucket {
                    Some(bucket) => (bucket.minutes, subsidiary_dtos(bucket.subsidiaries, names)),
                    None => (MinuteSplit::default(), Vec::new()),
                };
                EmployeeRollupDto {
                    employee_id: employee.id,
                    name: employee.full_name(),
                    subsidiary_name: display_subsidiaries.remove(&employee.id).map(|s| s.name),
                    service_names: service_names
                        .remove(&employee.id)
                        .unwrap_or_default()
                        .join(", "),
                    employee_code: employee.employee_code,
                    minutes: minutes.into(),
                    subsidiaries,
                }
            })
            .collect();

        Ok(PaginatedResponse::new(rows, page, per_page, total))
    }

    /// 従業員 × 子会社 の表
    async fn table_rows(
        &self,
        facts: &[EntryFact],
        names: &NameBook,
    ) -> AppResult<Vec<ReportTableRowDto>> {
        let cells = by_employee_subsidiary(facts);
        let employee_ids: BTreeSet<Uuid> = cells.iter().map(|c| c.employee_id).collect();
        let employee_names: BTreeMap<Uuid, String> = self
            .employee_repo
            .find_by_ids(&employee_ids.into_iter().collect::<Vec<_>>())
            .await?
            .into_iter()
            .map(|e| (e.id, e.full_name()))
            .collect();

        let mut rows: Vec<ReportTableRowDto> = cells
            .into_iter()
            .map(|cell| ReportTableRowDto {
                employee_id: cell.employee_id,
                employee_name: employee_names
                    .get(&cell.employee_id)
                    .cloned()
                    .unwrap_or_default(),
                subsidiary_id: cell.subsidiary_id,
                subsidiary_name: names.subsidiary(cell.subsidiary_id),
                total_minutes: cell.minutes.total,
                approved_minutes: cell.minutes.approved,
                pending_minutes: cell.minutes.pending(),
                total_hours: minutes_to_hours(cell.minutes.total),
                approved_hours: minutes_to_hours(cell.minutes.approved),
                pending_hours: minutes_to_hours(cell.minutes.pending()),
            })
            .collect();

        rows.sort_by(|a, b| {
            a.employee_name
                .cmp(&b.employee_name)
                .then_with(|| a.subsidiary_name.cmp(&b.subsidiary_name))
        });
        Ok(rows)
    }

    /// 呼び出し元本人の集計。従業員レコードがなければ None
    async fn personal(
        &self,
        actor: &Actor,
        range: DateRange,
        query: &ReportQuery,
    ) -> AppResult<Option<PersonalReportDto>> {
        let Some(employee_id) = actor.employee_id else {
            return Ok(None);
        };

        let scope = EntryScope {
            employee_ids: vec![employee_id],
            range: Some(range),
            subsidiary_id: query.subsidiary_id,
            ..Default::default()
        };
        let facts = self.repo.find_facts(&scope).await?;
        let names = self.name_book(&facts).await?;

        let buckets = by_subsidiary(&facts);
        let totals = sum_buckets(&buckets);

        Ok(Some(PersonalReportDto {
            employee_id,
            totals: totals.into(),
            by_subsidiary: subsidiary_dtos(buckets, &names),
        }))
    }
}

/// 開始・終了日を解決する。省略時は今月
pub(crate) fn resolve_range(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> AppResult<DateRange> {
    let month = DateRange::month_of(Utc::now().date_naive());
    DateRange::new(start.unwrap_or(month.start), end.unwrap_or(month.end))
        .map_err(|e| validation_error("end_date", &e))
}

fn sum_buckets(buckets: &[SubsidiaryBucket]) -> MinuteSplit {
    let mut totals = MinuteSplit::default();
    for bucket in buckets {
        totals += bucket.minutes;
    }
    totals
}

fn subsidiary_dtos(buckets: Vec<SubsidiaryBucket>, names: &NameBook) -> Vec<SubsidiaryRollupDto> {
    let mut dtos: Vec<SubsidiaryRollupDto> = buckets
        .into_iter()
        .map(|bucket| {
            let mut services: Vec<ServiceBreakdownDto> = bucket
                .services
                .into_iter()
                .map(|service| ServiceBreakdownDto {
                    service_id: service.service_id,
                    service_name: names.service(service.service_id),
                    minutes: service.minutes.into(),
                })
                .collect();
            services.sort_by(|a, b| a.service_name.cmp(&b.service_name));

            SubsidiaryRollupDto {
                subsidiary_id: bucket.subsidiary_id,
                subsidiary_name: names.subsidiary(bucket.subsidiary_id),
                minutes: MinutesDto::from(bucket.minutes),
                services,
            }
        })
        .collect();
    dtos.sort_by(|a, b| a.subsidiary_name.cmp(&b.subsidiary_name));
    dtos
}

fn service_dtos(rollups: Vec<ServiceRollup>, names: &NameBook) -> Vec<ServiceRollupDto> {
    let mut dtos: Vec<ServiceRollupDto> = rollups
        .into_iter()
        .map(|rollup| {
            let mut subsidiaries: Vec<SubsidiaryCellDto> = rollup
                .subsidiaries
                .into_iter()
                .map(|cell| SubsidiaryCellDto {
                    subsidiary_id: cell.subsidiary_id,
                    subsidiary_name: names.subsidiary(cell.subsidiary_id),
                    minutes: cell.minutes.into(),
                })
                .collect();
            subsidiaries.sort_by(|a, b| a.subsidiary_name.cmp(&b.subsidiary_name));

            ServiceRollupDto {
                service_id: rollup.service_id,
                service_name: names.service(rollup.service_id),
                minutes: rollup.minutes.into(),
                subsidiaries,
            }
        })
        .collect();
    // 「サービスなし」は末尾
    dtos.sort_by(|a, b| {
        a.service_id
            .is_none()
            .cmp(&b.service_id.is_none())
            .then_with(|| a.service_name.cmp(&b.service_name))
    });
    dtos
}
