// src/api/dto/mod.rs
pub mod dashboard_dto;
pub mod employee_dto;
pub mod estimation_dto;
pub mod notification_dto;
pub mod organization_dto;
pub mod report_dto;
pub mod time_entry_dto;
pub mod validation_dto;
