// src/service/mod.rs
pub mod dashboard_service;
pub mod employee_service;
pub mod estimation_service;
pub mod notification_service;
pub mod organization_service;
pub mod report_service;
pub mod scope_service;
pub mod time_entry_service;
pub mod validation_service;
