// timesheet-backend/src/repository/membership_repository.rs

use crate::domain::employee_model;
use crate::domain::employee_service_model::{
    self, ActiveModel as EmployeeServiceActiveModel, Entity as EmployeeServiceEntity,
};
use crate::domain::employee_subsidiary_model::{
    self, ActiveModel as EmployeeSubsidiaryActiveModel, Entity as EmployeeSubsidiaryEntity,
};
use crate::domain::service_model::{self, Entity as ServiceEntity};
use crate::domain::subsidiary_model::{self, Entity as SubsidiaryEntity};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DbConn, DbErr};
use sea_orm::{JoinType, QueryFilter, QueryOrder, RelationTrait};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// 従業員の所属（サービス・子会社）を扱うリポジトリ
///
/// 管轄の判定は毎回ここから最新の所属を読み直す。
pub struct MembershipRepository {
    db: DbConn,
}

impl MembershipRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// 従業員が所属する有効なサービス
    pub async fn service_ids_of(&self, employee_id: Uuid) -> Result<BTreeSet<Uuid>, DbErr> {
        let ids: Vec<Uuid> = EmployeeServiceEntity::find()
            .select_only()
            .column(employee_service_model::Column::ServiceId)
            .join(
                JoinType::InnerJoin,
                employee_service_model::Relation::Service.def(),
            )
            .filter(employee_service_model::Column::EmployeeId.eq(employee_id))
            .filter(service_model::Column::IsActive.eq(true))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// 指定サービスのいずれかに所属する有効な従業員
    pub async fn employees_in_services(
        &self,
        service_ids: &BTreeSet<Uuid>,
    ) -> Result<BTreeSet<Uuid>, DbErr> {
        if service_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let ids: Vec<Uuid> = EmployeeServiceEntity::find()
            .select_only()
            .column(employee_service_model::Column::EmployeeId)
            .join(
                JoinType::InnerJoin,
                employee_service_model::Relation::Service.def(),
            )
            .join(
                JoinType::InnerJoin,
                employee_service_model::Relation::Employee.def(),
            )
            .filter(
                employee_service_model::Column::ServiceId
                    .is_in(service_ids.iter().copied().collect::<Vec<_>>()),
            )
            .filter(service_model::Column::IsActive.eq(true))
            .filter(employee_model::Column::IsActive.eq(true))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// 従業員ごとのサービス名（名前順）
    pub async fn service_names_by_employee(
        &self,
        employee_ids: &[Uuid],
    ) -> Result<BTreeMap<Uuid, Vec<String>>, DbErr> {
        let mut names: BTreeMap<Uuid, Vec<String>> = BTreeMap::new();
        if employee_ids.is_empty() {
            return Ok(names);
        }

        let rows = EmployeeServiceEntity::find()
            .filter(employee_service_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .find_also_related(ServiceEntity)
            .order_by_asc(service_model::Column::Name)
            .all(&self.db)
            .await?;

        for (membership, service) in rows {
            if let Some(service) = service {
                names
                    .entry(membership.employee_id)
                    .or_default()
                    .push(service.name);
            }
        }
        Ok(names)
    }

    /// 従業員ごとの表示用子会社。主所属がなければ最初に登録された所属
    pub async fn display_subsidiary_by_employee(
        &self,
        employee_ids: &[Uuid],
    ) -> Result<BTreeMap<Uuid, subsidiary_model::Model>, DbErr> {
        let mut chosen: BTreeMap<Uuid, (bool, subsidiary_model::Model)> = BTreeMap::new();
        if employee_ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let rows = EmployeeSubsidiaryEntity::find()
            .filter(employee_subsidiary_model::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .find_also_related(SubsidiaryEntity)
            .order_by_asc(employee_subsidiary_model::Column::CreatedAt)
            .all(&self.db)
            .await?;

        for (membership, subsidiary) in rows {
            let Some(subsidiary) = subsidiary else {
                continue;
            };
            match chosen.get(&membership.employee_id) {
                Some((true, _)) => {}
                Some((false, _)) if !membership.is_primary => {}
                _ => {
                    chosen.insert(membership.employee_id, (membership.is_primary, subsidiary));
                }
            }
        }

        Ok(chosen
            .into_iter()
            .map(|(employee_id, (_, subsidiary))| (employee_id, subsidiary))
            .collect())
    }

    /// サービス所属を追加する（既にあれば何もしない）
    pub async fn assign_service(
        &self,
        employee_id: Uuid,
        service_id: Uuid,
        is_primary: bool,
    ) -> Result<(), DbErr> {
        let exists = EmployeeServiceEntity::find_by_id((employee_id, service_id))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Ok(());
        }

        EmployeeServiceActiveModel {
            employee_id: Set(employee_id),
            service_id: Set(service_id),
            is_primary: Set(is_primary),
            start_date: Set(None),
            end_date: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// 子会社所属を追加する（既にあれば何もしない）
    pub async fn assign_subsidiary(
        &self,
        employee_id: Uuid,
        subsidiary_id: Uuid,
        is_primary: bool,
    ) -> Result<(), DbErr> {
        let exists = EmployeeSubsidiaryEntity::find_by_id((employee_id, subsidiary_id))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Ok(());
        }

        EmployeeSubsidiaryActiveModel {
            employee_id: Set(employee_id),
            subsidiary_id: Set(subsidiary_id),
            is_primary: Set(is_primary),
            start_date: Set(None),
            end_date: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }
}
