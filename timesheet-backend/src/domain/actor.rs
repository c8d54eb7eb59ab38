// timesheet-backend/src/domain/actor.rs

use crate::domain::role_name::RoleSet;
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// リクエストごとにストアから再構築される呼び出し元
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub email: String,
    pub name: Option<String>,
    pub roles: RoleSet,
}

impl Actor {
    pub fn can_approve(&self) -> bool {
        self.roles.can_approve()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    /// 指定した従業員本人か
    pub fn owns(&self, employee_id: Uuid) -> bool {
        self.employee_id == Some(employee_id)
    }

    /// 通知などに表示する名前
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.email.clone(),
        }
    }
}

/// サービス所属が一つでも重なっているか
pub fn shares_service(a: &BTreeSet<Uuid>, b: &BTreeSet<Uuid>) -> bool {
    !a.is_disjoint(b)
}

/// 提出済みエントリーを審査できるか
///
/// ADMIN は常に可。MANAGER は自分の従業員レコードと対象従業員のサービス所属が
/// 重なる場合のみ可。それ以外は不可。
pub fn may_review(
    roles: &RoleSet,
    actor_service_ids: &BTreeSet<Uuid>,
    owner_service_ids: &BTreeSet<Uuid>,
) -> bool {
    if roles.is_admin() {
        return true;
    }
    roles.is_manager() && shares_service(actor_service_ids, owner_service_ids)
}
