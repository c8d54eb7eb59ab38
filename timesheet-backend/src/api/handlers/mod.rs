// src/api/handlers/mod.rs
pub mod notification_handler;
pub mod organization_handler;
pub mod report_handler;
pub mod system_handler;
pub mod timesheet_handler;
pub mod validation_handler;
