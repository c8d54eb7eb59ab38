// timesheet-backend/src/repository/time_entry_repository.rs

use crate::domain::period::DateRange;
use crate::domain::rollup::EntryFact;
use crate::domain::time_entry_model::{self, ActiveModel as TimeEntryActiveModel, Entity as TimeEntryEntity};
use crate::domain::time_entry_status::TimeEntryStatus;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DbConn, DbErr};
use sea_orm::{Condition, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 集計用の抽出条件
#[derive(Debug, Clone, Default)]
pub struct EntryScope {
    /// 閲覧可能な従業員。空なら結果も空
    pub employee_ids: Vec<Uuid>,
    pub range: Option<DateRange>,
    pub subsidiary_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub statuses: Vec<TimeEntryStatus>,
}

impl EntryScope {
    pub fn new(employee_ids: Vec<Uuid>, range: DateRange) -> Self {
        Self {
            employee_ids,
            range: Some(range),
            ..Default::default()
        }
    }

    fn condition(&self) -> Condition {
        let mut conditions =
            Condition::all().add(time_entry_model::Column::EmployeeId.is_in(self.employee_ids.clone()));

        if let Some(range) = self.range {
            conditions = conditions
                .add(time_entry_model::Column::WorkDate.gte(range.start))
                .add(time_entry_model::Column::WorkDate.lte(range.end));
        }
        if let Some(subsidiary_id) = self.subsidiary_id {
            conditions = conditions.add(time_entry_model::Column::SubsidiaryId.eq(subsidiary_id));
        }
        if let Some(employee_id) = self.employee_id {
            conditions = conditions.add(time_entry_model::Column::EmployeeId.eq(employee_id));
        }
        if !self.statuses.is_empty() {
            conditions = conditions.add(
                time_entry_model::Column::Status
                    .is_in(self.statuses.iter().map(|s| s.as_str()).collect::<Vec<_>>()),
            );
        }
        conditions
    }
}

pub struct TimeEntryRepository {
    db: DbConn,
}

impl TimeEntryRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<time_entry_model::Model>, DbErr> {
        TimeEntryEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn insert(
        &self,
        entry: TimeEntryActiveModel,
    ) -> Result<time_entry_model::Model, DbErr> {
        entry.insert(&self.db).await
    }

    /// 現在の状態が `expected` のままの場合のみ更新する。競合で更新できなければ None
    pub async fn update_if_status(
        &self,
        id: Uuid,
        expected: TimeEntryStatus,
        mut changes: TimeEntryActiveModel,
    ) -> Result<Option<time_entry_model::Model>, DbErr> {
        changes.updated_at = Set(Utc::now());

        let result = TimeEntryEntity::update_many()
            .set(changes)
            .filter(time_entry_model::Column::Id.eq(id))
            .filter(time_entry_model::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// DRAFT の場合のみ削除する
    pub async fn delete_if_draft(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = TimeEntryEntity::delete_many()
            .filter(time_entry_model::Column::Id.eq(id))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Draft.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn find_for_employee_in_range(
        &self,
        employee_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<time_entry_model::Model>, DbErr> {
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::EmployeeId.eq(employee_id))
            .filter(time_entry_model::Column::WorkDate.gte(range.start))
            .filter(time_entry_model::Column::WorkDate.lte(range.end))
            .order_by_asc(time_entry_model::Column::WorkDate)
            .order_by_asc(time_entry_model::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn find_recent_for_employee(
        &self,
        employee_id: Uuid,
        limit: u64,
    ) -> Result<Vec<time_entry_model::Model>, DbErr> {
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::EmployeeId.eq(employee_id))
            .order_by_desc(time_entry_model::Column::WorkDate)
            .order_by_desc(time_entry_model::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<time_entry_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
    }

    /// 集計用の行を1回のクエリで取得する
    pub async fn find_facts(&self, scope: &EntryScope) -> Result<Vec<EntryFact>, DbErr> {
        if scope.employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        let entries = TimeEntryEntity::find()
            .filter(scope.condition())
            .all(&self.db)
            .await?;
        Ok(entries.iter().map(time_entry_model::Model::fact).collect())
    }

    /// 指定状態のエントリーを持つ従業員ごとの件数
    pub async fn count_by_employee(
        &self,
        scope: &EntryScope,
    ) -> Result<BTreeMap<Uuid, u64>, DbErr> {
        let mut counts = BTreeMap::new();
        if scope.employee_ids.is_empty() {
            return Ok(counts);
        }

        let owners: Vec<Uuid> = TimeEntryEntity::find()
            .select_only()
            .column(time_entry_model::Column::EmployeeId)
            .filter(scope.condition())
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await?;

        for owner in owners {
            *counts.entry(owner).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub async fn find_pending(
        &self,
        employee_ids: &[Uuid],
        limit: u64,
    ) -> Result<Vec<time_entry_model::Model>, DbErr> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Submitted.as_str()))
            .order_by_desc(time_entry_model::Column::SubmittedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    pub async fn count_with_status(
        &self,
        employee_ids: &[Uuid],
        status: TimeEntryStatus,
    ) -> Result<u64, DbErr> {
        if employee_ids.is_empty() {
            return Ok(0);
        }
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .filter(time_entry_model::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
    }

    /// 期間内に承認されたエントリー数（approved_at 基準）
    pub async fn count_approved_between(
        &self,
        employee_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        if employee_ids.is_empty() {
            return Ok(0);
        }
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Approved.as_str()))
            .filter(time_entry_model::Column::ApprovedAt.gte(from))
            .filter(time_entry_model::Column::ApprovedAt.lt(to))
            .count(&self.db)
            .await
    }

    /// 期間内に却下されたエントリー数（updated_at 基準）
    pub async fn count_rejected_between(
        &self,
        employee_ids: &[Uuid],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        if employee_ids.is_empty() {
            return Ok(0);
        }
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Rejected.as_str()))
            .filter(time_entry_model::Column::UpdatedAt.gte(from))
            .filter(time_entry_model::Column::UpdatedAt.lt(to))
            .count(&self.db)
            .await
    }

    pub async fn count_in_range(&self, range: DateRange) -> Result<u64, DbErr> {
        TimeEntryEntity::find()
            .filter(time_entry_model::Column::WorkDate.gte(range.start))
            .filter(time_entry_model::Column::WorkDate.lte(range.end))
            .count(&self.db)
            .await
    }

    /// 所有者の下書きを一括提出する
    ///
    /// `only_ids` が空なら所有者の DRAFT すべてが対象。対象外のIDは無視する。
    /// 戻り値は実際に SUBMITTED になったエントリー。
    pub async fn submit_drafts(
        &self,
        employee_id: Uuid,
        only_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<time_entry_model::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let mut query = TimeEntryEntity::find()
            .select_only()
            .column(time_entry_model::Column::Id)
            .filter(time_entry_model::Column::EmployeeId.eq(employee_id))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Draft.as_str()));
        if !only_ids.is_empty() {
            query = query.filter(time_entry_model::Column::Id.is_in(only_ids.to_vec()));
        }
        let eligible: Vec<Uuid> = query.into_tuple::<Uuid>().all(&txn).await?;

        if eligible.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let result = TimeEntryEntity::update_many()
            .col_expr(
                time_entry_model::Column::Status,
                Expr::value(TimeEntryStatus::Submitted.as_str()),
            )
            .col_expr(time_entry_model::Column::SubmittedAt, Expr::value(now))
            .col_expr(time_entry_model::Column::UpdatedAt, Expr::value(now))
            .filter(time_entry_model::Column::Id.is_in(eligible.clone()))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Draft.as_str()))
            .exec(&txn)
            .await?;

        let submitted = if result.rows_affected > 0 {
            TimeEntryEntity::find()
                .filter(time_entry_model::Column::Id.is_in(eligible))
                .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Submitted.as_str()))
                .filter(time_entry_model::Column::SubmittedAt.eq(now))
                .order_by_asc(time_entry_model::Column::WorkDate)
                .all(&txn)
                .await?
        } else {
            Vec::new()
        };

        txn.commit().await?;
        Ok(submitted)
    }

    /// 審査可能と判定済みのIDを一括承認する
    ///
    /// 更新時点で SUBMITTED のままの行だけが対象になる。戻り値は
    /// （実際に更新した件数, このバッチで承認されたエントリー）。
    pub async fn approve_submitted(
        &self,
        eligible: &[Uuid],
        approver: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(u64, Vec<time_entry_model::Model>), DbErr> {
        if eligible.is_empty() {
            return Ok((0, Vec::new()));
        }

        let txn = self.db.begin().await?;

        let result = TimeEntryEntity::update_many()
            .col_expr(
                time_entry_model::Column::Status,
                Expr::value(TimeEntryStatus::Approved.as_str()),
            )
            .col_expr(time_entry_model::Column::ApprovedBy, Expr::value(approver))
            .col_expr(time_entry_model::Column::ApprovedAt, Expr::value(now))
            .col_expr(
                time_entry_model::Column::RejectionReason,
                Expr::value(Option::<String>::None),
            )
            .col_expr(time_entry_model::Column::UpdatedAt, Expr::value(now))
            .filter(time_entry_model::Column::Id.is_in(eligible.to_vec()))
            .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Submitted.as_str()))
            .exec(&txn)
            .await?;

        let approved = if result.rows_affected > 0 {
            TimeEntryEntity::find()
                .filter(time_entry_model::Column::Id.is_in(eligible.to_vec()))
                .filter(time_entry_model::Column::Status.eq(TimeEntryStatus::Approved.as_str()))
                .filter(time_entry_model::Column::ApprovedBy.eq(approver))
                .filter(time_entry_model::Column::ApprovedAt.eq(now))
                .all(&txn)
                .await?
        } else {
            Vec::new()
        };

        txn.commit().await?;
        Ok((result.rows_affected, approved))
    }
}
