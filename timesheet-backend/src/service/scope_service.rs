// src/service/scope_service.rs

use crate::db::DbPool;
use crate::domain::actor::{may_review, Actor};
use crate::domain::role_name::{RoleName, RoleSet};
use crate::domain::user_model;
use crate::error::{AppError, AppResult};
use crate::repository::employee_repository::EmployeeRepository;
use crate::repository::membership_repository::MembershipRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::error_helper::forbidden_error;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 呼び出し元の解決と、閲覧・操作できる範囲の計算
///
/// 所属は変わり得るので結果はキャッシュせず、呼び出しごとにストアを読む。
pub struct ScopeService {
    user_repo: Arc<UserRepository>,
    employee_repo: Arc<EmployeeRepository>,
    membership_repo: Arc<MembershipRepository>,
}

impl ScopeService {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            employee_repo: Arc::new(EmployeeRepository::new(db_pool.clone())),
            membership_repo: Arc::new(MembershipRepository::new(db_pool)),
        }
    }

    /// トークンのユーザーIDから呼び出し元を組み立てる
    pub async fn resolve_actor(&self, user_id: Uuid) -> AppResult<Actor> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        if !user.is_active {
            return Err(forbidden_error(
                "Account is inactive",
                "scope_service::resolve_actor",
                Some(&user_id.to_string()),
            ));
        }

        self.actor_from_user(user).await
    }

    pub async fn actor_from_user(&self, user: user_model::Model) -> AppResult<Actor> {
        let roles = RoleSet::from_names(self.user_repo.role_names(user.id).await?);
        Ok(Actor {
            user_id: user.id,
            employee_id: user.employee_id,
            email: user.email,
            name: user.name,
            roles,
        })
    }

    /// 従業員が所属する有効なサービス
    pub async fn service_ids_of(&self, employee_id: Uuid) -> AppResult<BTreeSet<Uuid>> {
        Ok(self.membership_repo.service_ids_of(employee_id).await?)
    }

    /// 呼び出し元が管理する従業員
    ///
    /// ADMIN は有効な従業員全員、MANAGER はサービス所属が重なる有効な従業員、
    /// それ以外は本人のみ。従業員レコードのない MANAGER は誰も管理しない。
    pub async fn managed_employee_ids(&self, actor: &Actor) -> AppResult<BTreeSet<Uuid>> {
        if actor.is_admin() {
            let ids = self.employee_repo.find_active_ids().await?;
            return Ok(ids.into_iter().collect());
        }

        let Some(employee_id) = actor.employee_id else {
            return Ok(BTreeSet::new());
        };

        if actor.roles.is_manager() {
            let service_ids = self.membership_repo.service_ids_of(employee_id).await?;
            let managed = self
                .membership_repo
                .employees_in_services(&service_ids)
                .await?;
            debug!(
                user_id = %actor.user_id,
                services = service_ids.len(),
                managed = managed.len(),
                "Resolved managed employees"
            );
            return Ok(managed);
        }

        Ok(BTreeSet::from([employee_id]))
    }

    /// 集計・一覧で見える従業員
    ///
    /// MANAGER / ADMIN は管理範囲、それ以外は本人のみ。
    pub async fn visible_employee_ids(&self, actor: &Actor) -> AppResult<BTreeSet<Uuid>> {
        if actor.can_approve() {
            return self.managed_employee_ids(actor).await;
        }
        Ok(actor.employee_id.into_iter().collect())
    }

    /// 指定従業員のエントリーを審査できるか
    pub async fn can_review(&self, actor: &Actor, owner_employee_id: Uuid) -> AppResult<bool> {
        if actor.is_admin() {
            return Ok(true);
        }
        if !actor.roles.is_manager() {
            return Ok(false);
        }
        let Some(employee_id) = actor.employee_id else {
            return Ok(false);
        };

        let actor_services = self.membership_repo.service_ids_of(employee_id).await?;
        let owner_services = self
            .membership_repo
            .service_ids_of(owner_employee_id)
            .await?;
        Ok(may_review(&actor.roles, &actor_services, &owner_services))
    }

    /// 審査できなければ Forbidden
    pub async fn authorize_review(&self, actor: &Actor, owner_employee_id: Uuid) -> AppResult<()> {
        if self.can_review(actor, owner_employee_id).await? {
            Ok(())
        } else {
            Err(forbidden_error(
                "You are not allowed to review this employee's time",
                "scope_service::authorize_review",
                Some(&actor.user_id.to_string()),
            ))
        }
    }

    /// 複数の所有者について審査可否をまとめて判定する
    ///
    /// 呼び出し元のサービス所属は1回だけ読む。
    pub async fn reviewable_owners(
        &self,
        actor: &Actor,
        owner_employee_ids: &BTreeSet<Uuid>,
    ) -> AppResult<BTreeSet<Uuid>> {
        if actor.is_admin() {
            return Ok(owner_employee_ids.clone());
        }
        let Some(employee_id) = actor.employee_id.filter(|_| actor.roles.is_manager()) else {
            return Ok(BTreeSet::new());
        };

        let actor_services = self.membership_repo.service_ids_of(employee_id).await?;
        let mut allowed = BTreeSet::new();
        for owner in owner_employee_ids {
            let owner_services = self.membership_repo.service_ids_of(*owner).await?;
            if may_review(&actor.roles, &actor_services, &owner_services) {
                allowed.insert(*owner);
            }
        }
        Ok(allowed)
    }

    /// 提出の通知先
    ///
    /// 提出者とサービス所属が重なる MANAGER と、すべての ADMIN（重複なし）。
    pub async fn submission_audience(
        &self,
        employee_id: Uuid,
    ) -> AppResult<Vec<user_model::Model>> {
        let service_ids = self.membership_repo.service_ids_of(employee_id).await?;
        let colleagues: Vec<Uuid> = self
            .membership_repo
            .employees_in_services(&service_ids)
            .await?
            .into_iter()
            .collect();

        let managers = self
            .user_repo
            .find_active_with_role_for_employees(RoleName::Manager, &colleagues)
            .await?;
        let admins = self.user_repo.find_active_with_role(RoleName::Admin).await?;

        let audience: BTreeMap<Uuid, user_model::Model> = managers
            .into_iter()
            .chain(admins)
            .map(|user| (user.id, user))
            .collect();
        Ok(audience.into_values().collect())
    }

    /// 従業員に紐付くユーザー（通知の宛先）
    pub async fn user_of_employee(
        &self,
        employee_id: Uuid,
    ) -> AppResult<Option<user_model::Model>> {
        Ok(self.user_repo.find_by_employee_id(employee_id).await?)
    }
}
