// timesheet-backend/src/utils/mod.rs

pub mod email;
pub mod error_helper;
pub mod jwt;
pub mod validation;
