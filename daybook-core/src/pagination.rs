//! Page slicing for ordered query results.

use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, DaybookResult};

/// Page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Used when a page number is given without a page size.
    pub default_page_size: u32,
    /// Largest accepted page size.
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_page_size: 20,
            max_page_size: 50,
        }
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> DaybookResult<()> {
        if self.max_page_size == 0 {
            return Err(DaybookError::Config(
                "pagination.max_page_size must be at least 1".into(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(DaybookError::Config(format!(
                "pagination.default_page_size must be between 1 and {}",
                self.max_page_size
            )));
        }
        Ok(())
    }
}

/// A requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Build a request from raw client parameters.
    ///
    /// Returns `None` when neither parameter is present, meaning the caller
    /// wants the whole result. Bounds are checked later by [`paginate`].
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        config: &PaginationConfig,
    ) -> DaybookResult<Option<Self>> {
        if page.is_none() && page_size.is_none() {
            return Ok(None);
        }

        let page = match page {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| DaybookError::PageNotFound(raw.to_string()))?,
            None => 1,
        };

        let page_size = match page_size {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| DaybookError::InvalidPageSize(raw.to_string()))?,
            None => config.default_page_size,
        };

        Ok(Some(PageRequest { page, page_size }))
    }

    /// Reject a page size outside `1..=max_page_size`.
    pub fn check_size(&self, config: &PaginationConfig) -> DaybookResult<()> {
        if self.page_size == 0 || self.page_size > config.max_page_size {
            return Err(DaybookError::InvalidPageSize(self.page_size.to_string()));
        }
        Ok(())
    }
}

/// One slice of a result set plus enough metadata to fetch the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// The whole result as one page.
    pub fn whole(items: Vec<T>) -> Self {
        let total_items = items.len();
        Page {
            page_size: u32::try_from(total_items).unwrap_or(u32::MAX),
            total_pages: u32::from(total_items > 0),
            page: 1,
            total_items,
            items,
        }
    }

    /// Replace the items, keeping the paging metadata.
    pub fn map_items<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> Page<U> {
        Page {
            items: f(self.items),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Slice `items` according to `request`.
///
/// An out-of-bounds page size is a bad request; a page past the end is not
/// found. Page 1 of an empty result is an empty page, not an error.
pub fn paginate<T>(
    items: Vec<T>,
    request: PageRequest,
    config: &PaginationConfig,
) -> DaybookResult<Page<T>> {
    request.check_size(config)?;
    let PageRequest { page, page_size } = request;

    let total_items = items.len();
    let size = page_size as usize;
    let total_pages = u32::try_from(total_items.div_ceil(size)).unwrap_or(u32::MAX);

    if page == 0 || page > total_pages.max(1) {
        return Err(DaybookError::PageNotFound(page.to_string()));
    }

    let offset = (page as usize - 1) * size;
    let items = items.into_iter().skip(offset).take(size).collect();

    Ok(Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    })
}
