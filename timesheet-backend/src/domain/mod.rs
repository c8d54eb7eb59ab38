// timesheet-backend/src/domain/mod.rs
pub mod actor;
pub mod company_model;
pub mod employee_model;
pub mod employee_service_model;
pub mod employee_subsidiary_model;
pub mod entry_lifecycle;
pub mod estimate;
pub mod notification_model;
pub mod notification_type;
pub mod period;
pub mod role_model;
pub mod role_name;
pub mod rollup;
pub mod service_model;
pub mod subsidiary_model;
pub mod subsidiary_service_model;
pub mod time_entry_model;
pub mod time_entry_status;
pub mod user_model;
pub mod user_role_model;
