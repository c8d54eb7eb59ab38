// src/api/dto/notification_dto.rs
use crate::domain::notification_model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: u64 = 20;
pub const DEFAULT_UNREAD_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct NotificationLimitQuery {
    pub limit: Option<u64>,
}

impl NotificationLimitQuery {
    pub fn resolve(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationDto {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub email_sent: bool,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<notification_model::Model> for NotificationDto {
    fn from(model: notification_model::Model) -> Self {
        Self {
            is_read: model.is_read(),
            id: model.id,
            notification_type: model.notification_type,
            title: model.title,
            message: model.message,
            data: model.data,
            email_sent: model.email_sent,
            read_at: model.read_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationDto>,
    pub total: u64,
    pub unread: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
