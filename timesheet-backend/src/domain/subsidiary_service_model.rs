// timesheet-backend/src/domain/subsidiary_service_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 子会社とサービスの紐付け。解除は is_active = false とし、行は残す
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subsidiary_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subsidiary_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: Uuid,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subsidiary_model::Entity",
        from = "Column::SubsidiaryId",
        to = "super::subsidiary_model::Column::Id",
        on_delete = "Cascade"
    )]
    Subsidiary,

    #[sea_orm(
        belongs_to = "super::service_model::Entity",
        from = "Column::ServiceId",
        to = "super::service_model::Column::Id",
        on_delete = "Cascade"
    )]
    Service,
}

impl Related<super::subsidiary_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subsidiary.def()
    }
}

impl Related<super::service_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
