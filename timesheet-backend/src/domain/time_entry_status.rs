// timesheet-backend/src/domain/time_entry_status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 勤怠エントリーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeEntryStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl TimeEntryStatus {
    /// 文字列から変換（大文字小文字は区別しない）
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "SUBMITTED" => Some(Self::Submitted),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// DBに保存する表記
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Draft, Self::Submitted, Self::Approved, Self::Rejected]
    }

    /// 承認画面で「すべて」を選んだ時に対象となる状態
    pub fn reviewed_or_pending() -> Vec<Self> {
        vec![Self::Submitted, Self::Approved, Self::Rejected]
    }

    /// 所有者が内容を編集できる状態か
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    /// 所有者が削除できる状態か
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// 承認者の判断待ちか
    pub fn is_awaiting_review(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// 有効なステータス遷移かチェック
    pub fn can_transition_to(&self, next: Self) -> bool {
        match (self, next) {
            // 提出
            (Self::Draft, Self::Submitted) => true,
            // 承認・却下
            (Self::Submitted, Self::Approved | Self::Rejected) => true,
            // 編集による差し戻し、またはマネージャーによる自己承認
            (Self::Draft | Self::Rejected, Self::Draft | Self::Approved) => true,
            _ => false,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl Default for TimeEntryStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for TimeEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeEntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid time entry status: '{}'. Valid statuses are: {}",
                s,
                Self::all()
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

// データベースとの変換用
impl From<TimeEntryStatus> for String {
    fn from(status: TimeEntryStatus) -> Self {
        status.as_str().to_string()
    }
}

impl TryFrom<&str> for TimeEntryStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
