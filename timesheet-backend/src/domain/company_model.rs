// timesheet-backend/src/domain/company_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 親会社
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subsidiary_model::Entity")]
    Subsidiaries,
}

impl Related<super::subsidiary_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subsidiaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
