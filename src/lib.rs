//! Deadlock-free concurrent sector allocation for an air-traffic
//! simulation: a centralized Banker's-algorithm controller, priority
//! waiting queues per sector, and forced-rollback preemption.

pub mod aircraft;
pub mod config;
pub mod controller;
pub mod error;
pub mod route;
pub mod sector;
pub mod sim;
pub mod stats;
pub mod types;
