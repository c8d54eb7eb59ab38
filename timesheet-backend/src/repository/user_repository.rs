// src/repository/user_repository.rs

use crate::domain::role_name::RoleName;
use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::domain::user_role_model::{
    self, ActiveModel as UserRoleActiveModel, Entity as UserRoleEntity,
};
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, Set};
use sea_orm::{JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait};
use uuid::Uuid;

#[derive(Debug)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    // --- 基本操作 ---

    /// ユーザーをIDで検索
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    /// 従業員に紐付くユーザー
    pub async fn find_by_employee_id(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::EmployeeId.eq(employee_id))
            .one(&self.db)
            .await
    }

    pub async fn create(
        &self,
        email: &str,
        name: Option<&str>,
        employee_id: Option<Uuid>,
    ) -> Result<user_model::Model, DbErr> {
        UserActiveModel {
            email: Set(email.to_string()),
            name: Set(name.map(str::to_string)),
            employee_id: Set(employee_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    pub async fn count_all(&self) -> Result<u64, DbErr> {
        UserEntity::find().count(&self.db).await
    }

    // --- ロール ---

    pub async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, DbErr> {
        UserRoleEntity::find()
            .select_only()
            .column(user_role_model::Column::RoleName)
            .filter(user_role_model::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(&self.db)
            .await
    }

    /// ロールを付与する（付与済みなら何もしない）
    pub async fn assign_role(&self, user_id: Uuid, role: RoleName) -> Result<(), DbErr> {
        let existing = UserRoleEntity::find_by_id((user_id, role.as_str().to_string()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        UserRoleActiveModel {
            user_id: Set(user_id),
            role_name: Set(role.as_str().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// 指定ロールを持つ有効なユーザー
    pub async fn find_active_with_role(
        &self,
        role: RoleName,
    ) -> Result<Vec<user_model::Model>, DbErr> {
        UserEntity::find()
            .join(JoinType::InnerJoin, user_model::Relation::UserRoles.def())
            .filter(user_role_model::Column::RoleName.eq(role.as_str()))
            .filter(user_model::Column::IsActive.eq(true))
            .order_by_asc(user_model::Column::Email)
            .all(&self.db)
            .await
    }

    /// 指定従業員に紐付き、指定ロールを持つ有効なユーザー
    pub async fn find_active_with_role_for_employees(
        &self,
        role: RoleName,
        employee_ids: &[Uuid],
    ) -> Result<Vec<user_model::Model>, DbErr> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        UserEntity::find()
            .join(JoinType::InnerJoin, user_model::Relation::UserRoles.def())
            .filter(user_role_model::Column::RoleName.eq(role.as_str()))
            .filter(user_model::Column::IsActive.eq(true))
            .filter(user_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .order_by_asc(user_model::Column::Email)
            .all(&self.db)
            .await
    }
}
