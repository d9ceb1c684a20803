//! Influence desk core: bloggers, counterparties, campaigns and placements,
//! with the overdue policy and dashboard metrics on top.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod desk;
pub mod error;
pub mod event;
pub mod export;
pub mod memory_store;
pub mod model;
pub mod placement_rules;
pub mod progress;
pub mod repository;
pub mod status_policy;
pub mod store;
pub mod task;
pub mod types;
