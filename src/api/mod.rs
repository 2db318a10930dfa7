//! HR backend access.
//!
//! This module provides the typed REST client, the [`EmployeeSource`] seam
//! the pagination loop is written against, and the loop itself.

pub mod client;
pub mod error;
pub mod pagination;

pub use client::ApiClient;
pub use error::ApiError;
pub use pagination::{collect_area, collect_areas, PaginationOptions, MAX_PAGE_SIZE};

use crate::models::{EmployeeRecord, Page};
use std::future::Future;

/// Anything that can serve employee pages for an area.
pub trait EmployeeSource {
    /// Fetch one 1-indexed page of the employees of `area_id`.
    fn fetch_page(
        &self,
        area_id: &str,
        page: usize,
        page_size: usize,
    ) -> impl Future<Output = Result<Page<EmployeeRecord>, ApiError>> + Send;
}
