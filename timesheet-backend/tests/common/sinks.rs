// tests/common/sinks.rs
//! メール送信の代わりに使う通知の配送先

use async_trait::async_trait;
use std::sync::Mutex;
use timesheet_backend::domain::{notification_model, user_model};
use timesheet_backend::service::notification_service::NotificationSink;
use timesheet_backend::utils::email::EmailError;

#[derive(Debug, Clone)]
pub struct Delivery {
    pub to: String,
    pub title: String,
    pub message: String,
}

/// 配送内容を記録するだけの sink
#[derive(Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingSink {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn deliveries_to(&self, email: &str) -> Vec<Delivery> {
        self.deliveries()
            .into_iter()
            .filter(|d| d.to == email)
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(
        &self,
        recipient: &user_model::Model,
        notification: &notification_model::Model,
    ) -> Result<(), EmailError> {
        self.deliveries.lock().unwrap().push(Delivery {
            to: recipient.email.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
        });
        Ok(())
    }
}

/// 常に失敗する sink
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn deliver(
        &self,
        _recipient: &user_model::Model,
        _notification: &notification_model::Model,
    ) -> Result<(), EmailError> {
        Err(EmailError::SendError("smtp unavailable".to_string()))
    }
}
