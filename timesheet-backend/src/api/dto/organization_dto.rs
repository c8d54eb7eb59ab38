// src/api/dto/organization_dto.rs
use crate::domain::{service_model, subsidiary_model};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug)]
pub struct ServiceLinkRequest {
    pub service_id: Uuid,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct SyncServicesRequest {
    /// 空なら子会社の紐付けをすべて無効にする
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl From<service_model::Model> for ServiceDto {
    fn from(model: service_model::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubsidiaryWithServicesDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub services: Vec<ServiceDto>,
}

impl SubsidiaryWithServicesDto {
    pub fn new(subsidiary: subsidiary_model::Model, services: Vec<ServiceDto>) -> Self {
        Self {
            id: subsidiary.id,
            code: subsidiary.code,
            name: subsidiary.name,
            services,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubsidiaryServicesResponse {
    pub subsidiaries: Vec<SubsidiaryWithServicesDto>,
    pub services: Vec<ServiceDto>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LinkChangeResponse {
    pub subsidiary_id: Uuid,
    pub service_ids: Vec<Uuid>,
}
