// timesheet-backend/src/domain/time_entry_model.rs

use super::entry_lifecycle::EntryState;
use super::rollup::EntryFact;
use super::time_entry_status::TimeEntryStatus;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 1エントリーの最小分数
pub const MIN_MINUTES: i32 = 1;
/// 1エントリーの最大分数（24時間）
pub const MAX_MINUTES: i32 = 1440;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub employee_id: Uuid,

    pub subsidiary_id: Uuid,

    #[sea_orm(nullable)]
    pub service_id: Option<Uuid>,

    pub work_date: NaiveDate,

    pub minutes: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,

    #[sea_orm(nullable)]
    pub requester: Option<String>,

    pub status: String,

    pub submitted_at: Option<DateTime<Utc>>,

    pub approved_at: Option<DateTime<Utc>>,

    #[sea_orm(nullable)]
    pub approved_by: Option<Uuid>,

    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee_model::Entity",
        from = "Column::EmployeeId",
        to = "super::employee_model::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,

    #[sea_orm(
        belongs_to = "super::subsidiary_model::Entity",
        from = "Column::SubsidiaryId",
        to = "super::subsidiary_model::Column::Id"
    )]
    Subsidiary,

    #[sea_orm(
        belongs_to = "super::service_model::Entity",
        from = "Column::ServiceId",
        to = "super::service_model::Column::Id",
        on_delete = "SetNull"
    )]
    Service,

    #[sea_orm(
        belongs_to = "super::user_model::Entity",
        from = "Column::ApprovedBy",
        to = "super::user_model::Column::Id",
        on_delete = "SetNull"
    )]
    Approver,
}

impl Related<super::employee_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::subsidiary_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subsidiary.def()
    }
}

impl Related<super::service_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            status: Set(TimeEntryStatus::Draft.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    /// DBの文字列を状態に変換する
    pub fn try_status(&self) -> Result<TimeEntryStatus, DbErr> {
        TimeEntryStatus::from_str(&self.status).ok_or_else(|| {
            DbErr::Type(format!(
                "unknown time entry status '{}' on entry {}",
                self.status, self.id
            ))
        })
    }

    /// 表示と集計用の状態。未知の値は WARN を出して DRAFT として扱う
    pub fn get_status(&self) -> TimeEntryStatus {
        self.try_status().unwrap_or_else(|e| {
            warn!(entry_id = %self.id, error = %e, "Unreadable time entry status");
            TimeEntryStatus::default()
        })
    }

    /// 状態遷移の計算に使う現在の状態。未知の状態からは遷移させない
    pub fn state(&self) -> Result<EntryState, DbErr> {
        Ok(EntryState {
            status: self.try_status()?,
            submitted_at: self.submitted_at,
            approval: match (self.approved_by, self.approved_at) {
                (Some(approved_by), Some(approved_at)) => {
                    Some(super::entry_lifecycle::ApprovalStamp {
                        approved_by,
                        approved_at,
                    })
                }
                _ => None,
            },
            rejection_reason: self.rejection_reason.clone(),
        })
    }

    pub fn fact(&self) -> EntryFact {
        EntryFact {
            employee_id: self.employee_id,
            subsidiary_id: self.subsidiary_id,
            service_id: self.service_id,
            work_date: self.work_date,
            minutes: i64::from(self.minutes),
            status: self.get_status(),
        }
    }
}

impl ActiveModel {
    /// 遷移後の状態を書き込む
    pub fn apply_state(&mut self, state: &EntryState) {
        self.status = Set(state.status.to_string());
        self.submitted_at = Set(state.submitted_at);
        self.approved_by = Set(state.approval.map(|a| a.approved_by));
        self.approved_at = Set(state.approval.map(|a| a.approved_at));
        self.rejection_reason = Set(state.rejection_reason.clone());
    }
}

/// 分数が許容範囲内か
pub fn is_valid_minutes(minutes: i32) -> bool {
    (MIN_MINUTES..=MAX_MINUTES).contains(&minutes)
}
