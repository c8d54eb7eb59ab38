// src/repository/notification_repository.rs

use crate::domain::notification_model::{
    self, ActiveModel as NotificationActiveModel, Entity as NotificationEntity,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DbConn, DbErr};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct NotificationRepository {
    db: DbConn,
}

impl NotificationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        notification: NotificationActiveModel,
    ) -> Result<notification_model::Model, DbErr> {
        notification.insert(&self.db).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<notification_model::Model>, DbErr> {
        NotificationEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn mark_email_sent(&self, id: Uuid) -> Result<(), DbErr> {
        NotificationEntity::update_many()
            .col_expr(notification_model::Column::EmailSent, Expr::value(true))
            .col_expr(notification_model::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<notification_model::Model>, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .order_by_desc(notification_model::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    pub async fn find_unread_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<notification_model::Model>, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .filter(notification_model::Column::ReadAt.is_null())
            .order_by_desc(notification_model::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    pub async fn count_unread(&self, user_id: Uuid) -> Result<u64, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .filter(notification_model::Column::ReadAt.is_null())
            .count(&self.db)
            .await
    }

    pub async fn count_for_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<(), DbErr> {
        let now = Utc::now();
        NotificationEntity::update_many()
            .col_expr(notification_model::Column::ReadAt, Expr::value(now))
            .col_expr(notification_model::Column::UpdatedAt, Expr::value(now))
            .filter(notification_model::Column::Id.eq(id))
            .filter(notification_model::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let now = Utc::now();
        let result = NotificationEntity::update_many()
            .col_expr(notification_model::Column::ReadAt, Expr::value(now))
            .col_expr(notification_model::Column::UpdatedAt, Expr::value(now))
            .filter(notification_model::Column::UserId.eq(user_id))
            .filter(notification_model::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
