//! Pagination constants, clamps, and the page envelope.
//!
//! This module lives in `core` (zero internal deps) so that the repository
//! layer and the API handlers agree on page bounds without either importing
//! the other.

use serde::Serialize;

/// Default number of records per page when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Maximum number of records per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp an optional page size into `[1, MAX_PAGE_SIZE]`.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Clamp an optional 0-based page index to be non-negative.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(0).max(0)
}

/// A bounded, ordered slice of a larger record set.
///
/// Carries the page coordinates it was produced for plus the total record
/// count so callers can compute how many pages exist.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 0-based page index.
    pub page: i64,
    pub page_size: i64,
    /// Total matching records across all pages.
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assemble a page envelope, deriving `total_pages` from the count.
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + page_size - 1) / page_size
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}
