// src/api/dto/employee_dto.rs
use crate::domain::employee_model;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VisibleEmployeeDto {
    pub id: Uuid,
    pub employee_code: String,
    pub name: String,
    pub email: Option<String>,
}

impl From<employee_model::Model> for VisibleEmployeeDto {
    fn from(model: employee_model::Model) -> Self {
        Self {
            name: model.full_name(),
            id: model.id,
            employee_code: model.employee_code,
            email: model.email,
        }
    }
}
