//! Truck loading planner.
//!
//! Given truck categories and box categories, computes candidate loading
//! plans, ranks them by completeness and cost, and describes the recommended
//! one with utilization and cost metrics.

pub mod cli;
pub mod config;
pub mod error;
pub mod insights;
pub mod model;
pub mod optimizer;
pub mod plan;
pub mod types;
pub mod units;
