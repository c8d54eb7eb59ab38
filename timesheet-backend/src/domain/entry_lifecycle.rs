// timesheet-backend/src/domain/entry_lifecycle.rs

//! 勤怠エントリーの状態遷移
//!
//! DBに触れない純粋な遷移計算のみを扱う。サービス層はここで得た
//! [`EntryState`] をそのまま永続化する。

use crate::domain::role_name::RoleSet;
use crate::domain::time_entry_status::TimeEntryStatus;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// 却下理由の最大文字数
pub const MAX_REJECTION_REASON_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("time entry is locked in status {status}")]
    Locked { status: TimeEntryStatus },

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: TimeEntryStatus,
        to: TimeEntryStatus,
    },
}

/// 承認者と承認日時
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalStamp {
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
}

/// 状態遷移で書き換わるフィールド一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryState {
    pub status: TimeEntryStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approval: Option<ApprovalStamp>,
    pub rejection_reason: Option<String>,
}

impl EntryState {
    /// 新規作成時の状態。MANAGER / ADMIN は作成と同時に承認済みになる
    pub fn on_create(roles: &RoleSet, actor_user_id: Uuid, now: DateTime<Utc>) -> Self {
        let (status, approval) = Self::draft_or_self_approved(roles, actor_user_id, now);
        Self {
            status,
            submitted_at: None,
            approval,
            rejection_reason: None,
        }
    }

    /// 所有者による編集。却下理由と承認情報はリセットされる
    pub fn edit(
        &self,
        roles: &RoleSet,
        actor_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, LifecycleError> {
        if !self.status.is_editable() {
            return Err(LifecycleError::Locked {
                status: self.status,
            });
        }

        let (status, approval) = Self::draft_or_self_approved(roles, actor_user_id, now);
        Ok(Self {
            status,
            submitted_at: self.submitted_at,
            approval,
            rejection_reason: None,
        })
    }

    /// DRAFT → SUBMITTED
    pub fn submit(&self, now: DateTime<Utc>) -> Result<Self, LifecycleError> {
        self.ensure(TimeEntryStatus::Submitted)?;
        Ok(Self {
            status: TimeEntryStatus::Submitted,
            submitted_at: Some(now),
            approval: None,
            rejection_reason: None,
        })
    }

    /// SUBMITTED → APPROVED
    pub fn approve(&self, approver: Uuid, now: DateTime<Utc>) -> Result<Self, LifecycleError> {
        self.ensure(TimeEntryStatus::Approved)?;
        Ok(Self {
            status: TimeEntryStatus::Approved,
            submitted_at: self.submitted_at,
            approval: Some(ApprovalStamp {
                approved_by: approver,
                approved_at: now,
            }),
            rejection_reason: None,
        })
    }

    /// SUBMITTED → REJECTED。承認情報は設定しない
    pub fn reject(&self, reason: String) -> Result<Self, LifecycleError> {
        self.ensure(TimeEntryStatus::Rejected)?;
        Ok(Self {
            status: TimeEntryStatus::Rejected,
            submitted_at: self.submitted_at,
            approval: None,
            rejection_reason: Some(reason),
        })
    }

    /// 削除できるのは DRAFT のみ
    pub fn ensure_deletable(&self) -> Result<(), LifecycleError> {
        if self.status.is_deletable() {
            Ok(())
        } else {
            Err(LifecycleError::Locked {
                status: self.status,
            })
        }
    }

    fn ensure(&self, next: TimeEntryStatus) -> Result<(), LifecycleError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self.status,
                to: next,
            })
        }
    }

    fn draft_or_self_approved(
        roles: &RoleSet,
        actor_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> (TimeEntryStatus, Option<ApprovalStamp>) {
        if roles.auto_approves_own_entries() {
            (
                TimeEntryStatus::Approved,
                Some(ApprovalStamp {
                    approved_by: actor_user_id,
                    approved_at: now,
                }),
            )
        } else {
            (TimeEntryStatus::Draft, None)
        }
    }
}

/// 却下理由を正規化する。空白のみ、または長すぎる場合は None
pub fn normalize_rejection_reason(raw: &str) -> Option<String> {
    let reason = raw.trim();
    if reason.is_empty() || reason.chars().count() > MAX_REJECTION_REASON_LEN {
        None
    } else {
        Some(reason.to_string())
    }
}
