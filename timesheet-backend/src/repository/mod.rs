// src/repository/mod.rs
pub mod employee_repository;
pub mod membership_repository;
pub mod notification_repository;
pub mod organization_repository;
pub mod time_entry_repository;
pub mod user_repository;
