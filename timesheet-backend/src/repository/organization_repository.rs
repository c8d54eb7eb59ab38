// src/repository/organization_repository.rs

use crate::domain::service_model::{self, Entity as ServiceEntity};
use crate::domain::subsidiary_model::{self, Entity as SubsidiaryEntity};
use crate::domain::subsidiary_service_model::{
    self, ActiveModel as SubsidiaryServiceActiveModel, Entity as SubsidiaryServiceEntity,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbConn, DbErr};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait};
use uuid::Uuid;

/// 子会社・サービスとその紐付けのリポジトリ
pub struct OrganizationRepository {
    db: DbConn,
}

impl OrganizationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    // --- 子会社 ---

    pub async fn find_subsidiary(
        &self,
        id: Uuid,
    ) -> Result<Option<subsidiary_model::Model>, DbErr> {
        SubsidiaryEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_subsidiaries(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<subsidiary_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        SubsidiaryEntity::find()
            .filter(subsidiary_model::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(subsidiary_model::Column::Name)
            .all(&self.db)
            .await
    }

    pub async fn active_subsidiaries(&self) -> Result<Vec<subsidiary_model::Model>, DbErr> {
        SubsidiaryEntity::find()
            .filter(subsidiary_model::Column::IsActive.eq(true))
            .order_by_asc(subsidiary_model::Column::Name)
            .all(&self.db)
            .await
    }

    pub async fn count_active_subsidiaries(&self) -> Result<u64, DbErr> {
        SubsidiaryEntity::find()
            .filter(subsidiary_model::Column::IsActive.eq(true))
            .count(&self.db)
            .await
    }

    // --- サービス ---

    pub async fn find_service(&self, id: Uuid) -> Result<Option<service_model::Model>, DbErr> {
        ServiceEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_services(&self, ids: &[Uuid]) -> Result<Vec<service_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ServiceEntity::find()
            .filter(service_model::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(service_model::Column::Name)
            .all(&self.db)
            .await
    }

    pub async fn active_services(&self) -> Result<Vec<service_model::Model>, DbErr> {
        ServiceEntity::find()
            .filter(service_model::Column::IsActive.eq(true))
            .order_by_asc(service_model::Column::Name)
            .all(&self.db)
            .await
    }

    pub async fn count_active_services(&self) -> Result<u64, DbErr> {
        ServiceEntity::find()
            .filter(service_model::Column::IsActive.eq(true))
            .count(&self.db)
            .await
    }

    // --- 子会社 ⇔ サービス ---

    /// 有効な紐付けを (子会社, サービス) の組で返す
    pub async fn active_links(&self) -> Result<Vec<subsidiary_service_model::Model>, DbErr> {
        SubsidiaryServiceEntity::find()
            .filter(subsidiary_service_model::Column::IsActive.eq(true))
            .all(&self.db)
            .await
    }

    /// 紐付けを有効にする。行がなければ作成する
    pub async fn attach(&self, subsidiary_id: Uuid, service_id: Uuid) -> Result<(), DbErr> {
        activate_link(&self.db, subsidiary_id, service_id).await
    }

    /// 紐付けを無効にする。行は残す
    pub async fn detach(&self, subsidiary_id: Uuid, service_id: Uuid) -> Result<u64, DbErr> {
        let result = SubsidiaryServiceEntity::update_many()
            .col_expr(subsidiary_service_model::Column::IsActive, Expr::value(false))
            .filter(subsidiary_service_model::Column::SubsidiaryId.eq(subsidiary_id))
            .filter(subsidiary_service_model::Column::ServiceId.eq(service_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 子会社の紐付けを指定サービスのみに揃える
    pub async fn sync(&self, subsidiary_id: Uuid, service_ids: &[Uuid]) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        SubsidiaryServiceEntity::update_many()
            .col_expr(subsidiary_service_model::Column::IsActive, Expr::value(false))
            .filter(subsidiary_service_model::Column::SubsidiaryId.eq(subsidiary_id))
            .exec(&txn)
            .await?;

        for service_id in service_ids {
            activate_link(&txn, subsidiary_id, *service_id).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

async fn activate_link<C>(conn: &C, subsidiary_id: Uuid, service_id: Uuid) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let result = SubsidiaryServiceEntity::update_many()
        .col_expr(subsidiary_service_model::Column::IsActive, Expr::value(true))
        .filter(subsidiary_service_model::Column::SubsidiaryId.eq(subsidiary_id))
        .filter(subsidiary_service_model::Column::ServiceId.eq(service_id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        SubsidiaryServiceActiveModel {
            subsidiary_id: Set(subsidiary_id),
            service_id: Set(service_id),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}
