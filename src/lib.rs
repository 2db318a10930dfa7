//! HRPulse library.
//!
//! The metrics core ([`metrics::aggregate`] and the rollups built on it) is
//! pure and usable on its own; [`api`] fetches complete per-area employee
//! lists from the HR backend to feed it.

pub mod api;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod models;
pub mod report;
