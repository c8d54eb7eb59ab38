// timesheet-backend/src/domain/employee_subsidiary_model.rs

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_subsidiaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub employee_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub subsidiary_id: Uuid,

    /// レポートで従業員の所属子会社として表示する
    pub is_primary: bool,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee_model::Entity",
        from = "Column::EmployeeId",
        to = "super::employee_model::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,

    #[sea_orm(
        belongs_to = "super::subsidiary_model::Entity",
        from = "Column::SubsidiaryId",
        to = "super::subsidiary_model::Column::Id"
    )]
    Subsidiary,
}

impl Related<super::employee_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::subsidiary_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subsidiary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
