//! Pagination helper types for repository queries

use crate::{LibraryError, Result};
use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Current page number (0-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl PageRequest {
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(2, 5);
    /// assert_eq!(request.offset(), 10);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Page request from a 1-based page number, where 0 means the first page.
    ///
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// assert_eq!(PageRequest::from_one_based(0, 5), PageRequest::new(0, 5));
    /// assert_eq!(PageRequest::from_one_based(3, 5), PageRequest::new(2, 5));
    /// ```
    pub fn from_one_based(page: u32, page_size: u32) -> Self {
        Self::new(page.saturating_sub(1), page_size)
    }

    /// Rejects empty or oversized pages.
    pub fn validated(self) -> Result<Self> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(LibraryError::invalid_input(
                "page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(self)
    }

    /// SQL OFFSET value
    pub fn offset(&self) -> u32 {
        self.page.saturating_mul(self.page_size)
    }

    /// SQL LIMIT value
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 20,
        }
    }
}

/// Paginated response containing items and metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: u64,
    /// Current page number (0-indexed)
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = if request.page_size == 0 {
            0
        } else {
            total.div_ceil(u64::from(request.page_size)) as u32
        };

        Self {
            items,
            total,
            page: request.page,
            total_pages,
            page_size: request.page_size,
        }
    }

    /// Empty page that still reports the requested position.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        let (items, meta) = self.into_parts();
        meta.with_items(items.into_iter().map(f).collect())
    }

    /// Splits the page into its items and a rebuilder, for projections that
    /// need async lookups per item.
    pub fn into_parts(self) -> (Vec<T>, PageMeta) {
        (
            self.items,
            PageMeta {
                total: self.total,
                page: self.page,
                total_pages: self.total_pages,
                page_size: self.page_size,
            },
        )
    }
}

/// Page metadata detached from its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl PageMeta {
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}
