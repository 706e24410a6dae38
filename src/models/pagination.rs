// src/models/pagination.rs
// DOCUMENTATION: Page/per_page handling shared by every list endpoint
// PURPOSE: Clamp client input and build the `meta` block

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 25;
pub const MAX_PER_PAGE: i64 = 100;

/// Raw `?page=&per_page=` query parameters
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Normalized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn from_params(page: Option<i64>, per_page: Option<i64>) -> Self {
        let per_page = match per_page {
            Some(n) if n > 0 => n.min(MAX_PER_PAGE),
            _ => DEFAULT_PER_PAGE,
        };

        Page {
            page: page.unwrap_or(1).max(1),
            per_page,
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn meta(&self, total_count: i64) -> PaginationMeta {
        PaginationMeta {
            current_page: self.page,
            total_pages: (total_count + self.per_page - 1) / self.per_page,
            total_count,
            per_page: self.per_page,
        }
    }
}

impl From<&PaginationParams> for Page {
    fn from(params: &PaginationParams) -> Self {
        Page::from_params(params.page, params.per_page)
    }
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub per_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::from_params(None, None);
        assert_eq!(page, Page { page: 1, per_page: DEFAULT_PER_PAGE });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Page::from_params(Some(0), Some(500)).per_page, MAX_PER_PAGE);
        assert_eq!(Page::from_params(Some(-3), Some(0)).page, 1);
        assert_eq!(Page::from_params(None, Some(-1)).per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_offset_and_meta() {
        let page = Page::from_params(Some(3), Some(2));
        assert_eq!(page.offset(), 4);

        let meta = Page::from_params(Some(1), Some(2)).meta(5);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total_count, 5);
        assert_eq!(meta.per_page, 2);
        assert_eq!(meta.current_page, 1);

        assert_eq!(page.meta(0).total_pages, 0);
    }
}
