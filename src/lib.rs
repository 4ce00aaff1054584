//! nippo: monthly aggregation of construction daily reports
//!
//! Reads daily reports from a store, classifies worker hours into
//! weekday/Sunday and normal/overtime/late-night buckets, and rolls up
//! materials and subcontractors for one period.

pub mod cli;
pub mod config;
pub mod export;
pub mod server;
pub mod services;
pub mod store;
pub mod types;
