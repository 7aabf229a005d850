//! Page requests and page results

use crate::errors::QueryError;
use serde::{Deserialize, Serialize};

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PaginationRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page < 1 {
            return Err(QueryError::InvalidPagination(format!(
                "page must be at least 1, got {}",
                self.page
            )));
        }
        if self.page_size < 1 {
            return Err(QueryError::InvalidPagination(format!(
                "pageSize must be at least 1, got {}",
                self.page_size
            )));
        }
        if (self.page - 1).checked_mul(self.page_size).is_none() {
            return Err(QueryError::InvalidPagination(format!(
                "page {} of size {} is out of range",
                self.page, self.page_size
            )));
        }
        Ok(())
    }

    /// Rows skipped before this page, saturating at `i64::MAX`
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.page_size.max(0))
    }
}

/// One page of rows plus the navigation facts derived from the total count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> PaginatedResult<T> {
    /// Derive the page navigation fields from `total_count` and `page_size` alone
    pub fn new(items: Vec<T>, request: PaginationRequest, total_count: u64) -> Self {
        let page_size = request.page_size.max(1) as u64;
        let total_pages = total_count.div_ceil(page_size);
        let page = request.page.max(1) as u64;

        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_count,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}
