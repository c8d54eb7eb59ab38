// timesheet-backend/src/domain/notification_type.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 状態遷移をきっかけに送られる通知の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "TASK_SUBMITTED")]
    Submitted,
    #[serde(rename = "TASK_APPROVED")]
    Approved,
    #[serde(rename = "TASK_REJECTED")]
    Rejected,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "TASK_SUBMITTED",
            Self::Approved => "TASK_APPROVED",
            Self::Rejected => "TASK_REJECTED",
        }
    }

    /// 通知タイトル
    pub fn title(&self) -> &'static str {
        match self {
            Self::Submitted => "New time submitted",
            Self::Approved => "Time approved",
            Self::Rejected => "Time rejected",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
