//! Metrics computation.
//!
//! `aggregator` holds the single eNPS/satisfaction computation; `rollup`
//! applies it per area and builds the headcount views on top.

pub mod aggregator;
pub mod rollup;

pub use aggregator::aggregate;
pub use rollup::{
    filter_directorate, rollup_areas, rollup_by_area, rollup_hierarchy, tenure_distribution,
};
