// src/service/employee_service.rs

use crate::api::dto::employee_dto::VisibleEmployeeDto;
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::error::AppResult;
use crate::repository::employee_repository::EmployeeRepository;
use crate::service::scope_service::ScopeService;
use std::sync::Arc;

pub struct EmployeeService {
    employee_repo: Arc<EmployeeRepository>,
    scope_service: Arc<ScopeService>,
}

impl EmployeeService {
    pub fn new(db_pool: DbPool, scope_service: Arc<ScopeService>) -> Self {
        Self {
            employee_repo: Arc::new(EmployeeRepository::new(db_pool)),
            scope_service,
        }
    }

    /// 呼び出し元の管理範囲にいる従業員（名前順）
    pub async fn visible(&self, actor: &Actor) -> AppResult<Vec<VisibleEmployeeDto>> {
        let ids: Vec<_> = self
            .scope_service
            .managed_employee_ids(actor)
            .await?
            .into_iter()
            .collect();
        let employees = self.employee_repo.find_by_ids(&ids).await?;
        Ok(employees.into_iter().map(Into::into).collect())
    }
}
