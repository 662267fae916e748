//! Offset pagination for post listings
//!
//! Pages are recomputed from scratch on every request; there is no cursor
//! continuation, so inserts or deletes between page loads can shift rows.
//! Under no concurrent writes, concatenating all pages reproduces the
//! unpaged listing.

use serde::{Deserialize, Serialize};

/// Fixed page size used by the committee dashboards.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Clamps `page` to at least 1 and `per_page` to at least 1.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    /// Rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of results together with the paging envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page);
        let total_pages = total.div_ceil(per_page).min(u64::from(u32::MAX)) as u32;
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages,
        }
    }
}
