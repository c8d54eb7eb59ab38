// src/service/notification_service.rs

use crate::api::dto::notification_dto::{
    MarkAllReadResponse, NotificationDto, NotificationListResponse, UnreadCountResponse,
};
use crate::db::DbPool;
use crate::domain::notification_model::{self, ActiveModel as NotificationActiveModel};
use crate::domain::notification_type::NotificationType;
use crate::domain::rollup::{minutes_to_hours, round_to};
use crate::domain::{employee_model, time_entry_model, user_model};
use crate::error::{AppError, AppResult};
use crate::repository::notification_repository::NotificationRepository;
use crate::utils::email::{mask_email, EmailError, EmailMessage, EmailService};
use crate::utils::error_helper::forbidden_error;
use crate::utils::validation::is_valid_email;
use async_trait::async_trait;
use sea_orm::Set;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 通知の外部配送先
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(
        &self,
        recipient: &user_model::Model,
        notification: &notification_model::Model,
    ) -> Result<(), EmailError>;
}

#[async_trait]
impl NotificationSink for EmailService {
    async fn deliver(
        &self,
        recipient: &user_model::Model,
        notification: &notification_model::Model,
    ) -> Result<(), EmailError> {
        let message = EmailMessage::notification(
            &recipient.email,
            recipient.name.as_deref(),
            &notification.title,
            &notification.message,
        );
        self.send_email(message).await
    }
}

/// 作成する通知の内容
struct Draft {
    kind: NotificationType,
    message: String,
    data: serde_json::Value,
}

/// 状態遷移に伴う通知の作成と配送
pub struct NotificationService {
    repo: Arc<NotificationRepository>,
    sink: Arc<dyn NotificationSink>,
    email_enabled: bool,
}

impl NotificationService {
    pub fn new(db_pool: DbPool, sink: Arc<dyn NotificationSink>, email_enabled: bool) -> Self {
        Self {
            repo: Arc::new(NotificationRepository::new(db_pool)),
            sink,
            email_enabled,
        }
    }

    // --- 状態遷移フック ---

    /// 提出の通知。提出者ごとに1回呼ばれる
    pub async fn notify_submitted(
        &self,
        employee: &employee_model::Model,
        entries: &[time_entry_model::Model],
        audience: &[user_model::Model],
    ) -> usize {
        let minutes = total_minutes(entries);
        let employee_name = employee.full_name();
        let draft = Draft {
            kind: NotificationType::Submitted,
            message: format!(
                "{} submitted {} entry(ies) ({}h) for review.",
                employee_name,
                entries.len(),
                round_to(minutes as f64 / 60.0, 1)
            ),
            data: json!({
                "employee_id": employee.id,
                "employee_name": employee_name,
                "time_entry_ids": entry_ids(entries),
                "total_hours": minutes_to_hours(minutes),
                "entry_count": entries.len(),
            }),
        };

        let mut created = 0;
        for recipient in audience {
            if self.dispatch(recipient, &draft).await {
                created += 1;
            }
        }
        created
    }

    /// 承認の通知。所有者ごとに1回呼ばれる
    pub async fn notify_approved(
        &self,
        owner: &user_model::Model,
        entries: &[time_entry_model::Model],
        approver_name: &str,
    ) -> bool {
        let minutes = total_minutes(entries);
        let draft = Draft {
            kind: NotificationType::Approved,
            message: format!(
                "{} approved {} entry(ies) ({}h).",
                approver_name,
                entries.len(),
                round_to(minutes as f64 / 60.0, 1)
            ),
            data: json!({
                "time_entry_ids": entry_ids(entries),
                "total_hours": minutes_to_hours(minutes),
                "approved_by": approver_name,
            }),
        };
        self.dispatch(owner, &draft).await
    }

    /// 却下の通知
    pub async fn notify_rejected(
        &self,
        owner: &user_model::Model,
        entry: &time_entry_model::Model,
        rejected_by: &str,
        reason: &str,
    ) -> bool {
        let draft = Draft {
            kind: NotificationType::Rejected,
            message: format!(
                "{} rejected your entry for {}: {}",
                rejected_by,
                entry.work_date.format("%Y-%m-%d"),
                reason
            ),
            data: json!({
                "time_entry_id": entry.id,
                "hours": minutes_to_hours(i64::from(entry.minutes)),
                "rejected_by": rejected_by,
                "reason": reason,
            }),
        };
        self.dispatch(owner, &draft).await
    }

    /// 通知を記録し、外部配送を1回だけ試みる
    ///
    /// 失敗はログに残すだけで呼び出し元には返さない。
    async fn dispatch(&self, recipient: &user_model::Model, draft: &Draft) -> bool {
        let record = NotificationActiveModel {
            user_id: Set(recipient.id),
            notification_type: Set(draft.kind.as_str().to_string()),
            title: Set(draft.kind.title().to_string()),
            message: Set(draft.message.clone()),
            data: Set(draft.data.clone()),
            ..Default::default()
        };

        let notification = match self.repo.insert(record).await {
            Ok(notification) => notification,
            Err(e) => {
                error!(
                    error = %e,
                    user_id = %recipient.id,
                    notification_type = draft.kind.as_str(),
                    "Failed to record notification"
                );
                return false;
            }
        };

        if !self.email_enabled {
            return true;
        }
        if !is_valid_email(&recipient.email) {
            warn!(
                notification_id = %notification.id,
                user_id = %recipient.id,
                "Skipping delivery: recipient has no valid email"
            );
            return true;
        }

        match self.sink.deliver(recipient, &notification).await {
            Ok(()) => {
                if let Err(e) = self.repo.mark_email_sent(notification.id).await {
                    error!(
                        error = %e,
                        notification_id = %notification.id,
                        "Failed to mark notification as delivered"
                    );
                }
                info!(
                    notification_id = %notification.id,
                    to = %mask_email(&recipient.email),
                    notification_type = draft.kind.as_str(),
                    "Notification delivered"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    notification_id = %notification.id,
                    to = %mask_email(&recipient.email),
                    "Notification delivery failed"
                );
            }
        }
        true
    }

    // --- 受信箱 ---

    pub async fn list(&self, user_id: Uuid, limit: u64) -> AppResult<NotificationListResponse> {
        let notifications = self.repo.find_for_user(user_id, limit).await?;
        let total = self.repo.count_for_user(user_id).await?;
        let unread = self.repo.count_unread(user_id).await?;

        Ok(NotificationListResponse {
            notifications: notifications.into_iter().map(Into::into).collect(),
            total,
            unread,
        })
    }

    pub async fn unread(&self, user_id: Uuid, limit: u64) -> AppResult<Vec<NotificationDto>> {
        let notifications = self.repo.find_unread_for_user(user_id, limit).await?;
        Ok(notifications.into_iter().map(Into::into).collect())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<UnreadCountResponse> {
        Ok(UnreadCountResponse {
            unread: self.repo.count_unread(user_id).await?,
        })
    }

    /// 既読にする。本人宛て以外は Forbidden
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<NotificationDto> {
        let notification = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

        if notification.user_id != user_id {
            return Err(forbidden_error(
                "This notification belongs to another user",
                "notification_service::mark_read",
                Some(&user_id.to_string()),
            ));
        }

        self.repo.mark_read(id).await?;
        let updated = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
        Ok(updated.into())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<MarkAllReadResponse> {
        let updated = self.repo.mark_all_read(user_id).await?;
        info!(user_id = %user_id, updated, "Marked all notifications as read");
        Ok(MarkAllReadResponse { updated })
    }
}

fn total_minutes(entries: &[time_entry_model::Model]) -> i64 {
    entries.iter().map(|e| i64::from(e.minutes)).sum()
}

fn entry_ids(entries: &[time_entry_model::Model]) -> Vec<Uuid> {
    entries.iter().map(|e| e.id).collect()
}
