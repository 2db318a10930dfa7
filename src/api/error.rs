//! Errors raised while talking to the HR backend.

use thiserror::Error;

/// Failures of the backend collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to backend at {0}. Is the API running?")]
    Connect(String),

    #[error("Backend API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Area {area_id} still had full pages after {max_pages} pages")]
    PaginationLimit { area_id: String, max_pages: usize },

    #[error("Area {area_id} pages ran out at {collected} of {total} employees")]
    Incomplete {
        area_id: String,
        collected: usize,
        total: usize,
    },

    #[error("Backend returned no companies")]
    NoCompany,
}
