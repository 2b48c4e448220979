// src/engine/mod.rs

//! Attempt aggregation and ranking: dedup → rank, memoized per search key.

pub mod dashboard;
pub mod dedup;
pub mod rank;

pub use dashboard::DashboardCache;
