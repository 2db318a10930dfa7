//! Page-by-page assembly of an area's full employee list.
//!
//! The backend caps `page_size` at 100, so aggregating the first page alone
//! silently drops everyone past the hundredth employee. Callers must go
//! through [`collect_area`] before aggregating.

use crate::api::{ApiError, EmployeeSource};
use crate::models::EmployeeRecord;
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// Pagination settings.
#[derive(Debug, Clone)]
pub struct PaginationOptions {
    /// Requested page size; clamped to `1..=MAX_PAGE_SIZE`.
    pub page_size: usize,
    /// Give up after this many full pages.
    pub max_pages: usize,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: 1000,
        }
    }
}

impl From<&crate::config::ApiConfig> for PaginationOptions {
    fn from(config: &crate::config::ApiConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }
}

/// Fetch every page of an area until a short page comes back.
///
/// A short page while the backend still reports more employees than were
/// collected is never returned as a complete list: on page 1 it is taken
/// as a silent lower page-size cap and fetching continues, later on it is
/// an [`ApiError::Incomplete`].
pub async fn collect_area<S: EmployeeSource>(
    source: &S,
    area_id: &str,
    options: &PaginationOptions,
) -> Result<Vec<EmployeeRecord>, ApiError> {
    let page_size = options.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut served_size = page_size;
    let mut records = Vec::new();
    let mut reported_total = 0;

    for page in 1..=options.max_pages {
        let batch = source.fetch_page(area_id, page, page_size).await?;
        let received = batch.items.len();
        reported_total = batch.total;

        // A backend with a lower cap echoes the size it actually used.
        if let Some(echoed) = batch.page_size {
            if echoed > 0 && echoed < served_size {
                debug!("Area {}: backend capped page size at {}", area_id, echoed);
                served_size = echoed;
            }
        }
        records.extend(batch.items);

        debug!(
            "Area {} page {}: {} items ({} so far)",
            area_id,
            page,
            received,
            records.len()
        );

        if received >= served_size {
            continue;
        }

        if reported_total > records.len() {
            if page == 1 && received > 0 {
                debug!(
                    "Area {}: short first page of {} with {} reported, assuming a silent page-size cap",
                    area_id, received, reported_total
                );
                served_size = received;
                continue;
            }

            warn!(
                "Area {}: pages ran out at {} of {} reported employees",
                area_id,
                records.len(),
                reported_total
            );
            return Err(ApiError::Incomplete {
                area_id: area_id.to_string(),
                collected: records.len(),
                total: reported_total,
            });
        }

        if reported_total > 0 && reported_total != records.len() {
            warn!(
                "Area {}: collected {} employees but backend reports {}",
                area_id,
                records.len(),
                reported_total
            );
        }
        return Ok(records);
    }

    warn!(
        "Area {}: stopped after {} pages ({} collected, {} reported)",
        area_id,
        options.max_pages,
        records.len(),
        reported_total
    );
    Err(ApiError::PaginationLimit {
        area_id: area_id.to_string(),
        max_pages: options.max_pages,
    })
}

/// Collect several areas with at most `concurrency` in flight.
///
/// Results come back in the same order as `areas`, whatever order the
/// requests finish in. The first failure aborts the whole collection.
pub async fn collect_areas<S: EmployeeSource>(
    source: &S,
    areas: Vec<(String, Option<String>)>,
    options: &PaginationOptions,
    concurrency: usize,
    progress: Option<&ProgressBar>,
) -> Result<Vec<(String, Option<String>, Vec<EmployeeRecord>)>, ApiError> {
    info!(
        "Fetching employees for {} areas ({} at a time)",
        areas.len(),
        concurrency
    );

    stream::iter(areas)
        .map(|(area_id, area_name)| async move {
            let records = collect_area(source, &area_id, options).await?;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            Ok::<_, ApiError>((area_id, area_name, records))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
