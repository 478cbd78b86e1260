//! Page-addressable view over the trade list.

use crate::datasource::{DataSource, DataSourceError, PageRequest, PositionFilter};
use crate::domain::PositionRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Number of page buttons shown around the current page.
pub const PAGE_BUTTONS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

/// Position of the current page within the trade list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub page_index: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PageWindow {
    pub fn new(page_index: u64, page_size: u64, total_count: u64) -> Self {
        Self {
            page_index,
            page_size,
            total_count,
            total_pages: total_pages(total_count, page_size),
        }
    }

    /// Highest page index that can be navigated to. An empty list still has
    /// page 1.
    pub fn last_page(&self) -> u64 {
        self.total_pages.max(1)
    }

    pub fn contains(&self, index: u64) -> bool {
        (1..=self.last_page()).contains(&index)
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    pub fn buttons(&self) -> Vec<u64> {
        page_buttons(self.page_index, self.total_pages)
    }
}

/// `ceil(total_count / page_size)`. `page_size` must be non-zero.
pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    total_count.div_ceil(page_size)
}

/// Inclusive row window for a 1-based page index. `None` for index 0,
/// size 0, or a window past `u64::MAX`.
pub fn page_request(index: u64, size: u64) -> Option<PageRequest> {
    let from = index.checked_sub(1)?.checked_mul(size)?;
    let to = from.checked_add(size.checked_sub(1)?)?;
    Some(PageRequest { from, to })
}

/// Page numbers to display: `min(3, total_pages)` consecutive pages centred
/// on `current`, slid inwards when `current` is at either edge.
pub fn page_buttons(current: u64, total_pages: u64) -> Vec<u64> {
    let width = PAGE_BUTTONS.min(total_pages);
    if width == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let mut start = current.saturating_sub(PAGE_BUTTONS / 2).max(1);
    if start + width - 1 > total_pages {
        start = total_pages + 1 - width;
    }
    (start..start + width).collect()
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum Navigation {
    /// The requested page is now current.
    Loaded,
    /// The index was outside `1..=max(1, total_pages)`; the previous page
    /// is retained.
    Rejected { requested: u64 },
}

/// Stateful controller for the trade list.
///
/// Holds the current page and its records. A failed fetch clears the record
/// list and records the error; an out-of-range request changes nothing.
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: u64,
    filter: PositionFilter,
    window: Option<PageWindow>,
    records: Vec<PositionRecord>,
    last_error: Option<DataSourceError>,
}

impl Paginator {
    pub fn new(page_size: u64) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::InvalidPageSize);
        }
        Ok(Self {
            page_size,
            filter: PositionFilter::all(),
            window: None,
            records: Vec::new(),
            last_error: None,
        })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Current page metadata; `None` until a page has loaded.
    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    pub fn records(&self) -> &[PositionRecord] {
        &self.records
    }

    pub fn last_error(&self) -> Option<&DataSourceError> {
        self.last_error.as_ref()
    }

    /// Index to reload when no page is requested explicitly.
    pub fn current_index(&self) -> u64 {
        self.window.map(|w| w.page_index).unwrap_or(1)
    }

    /// Navigate to page `index` of `size` rows.
    ///
    /// The page rows and the total count are queried concurrently and the
    /// index is validated against the fresh count, so pages added since the
    /// last load are reachable. Index 0 and indexes whose row window
    /// overflows are rejected without a query. A page size different from
    /// the current one starts a new window.
    pub async fn page(
        &mut self,
        source: &dyn DataSource,
        index: u64,
        size: u64,
    ) -> Result<Navigation, PaginationError> {
        if size == 0 {
            return Err(PaginationError::InvalidPageSize);
        }
        if size != self.page_size {
            self.page_size = size;
            self.window = None;
        }

        let Some(request) = page_request(index, size) else {
            warn!(requested = index, "Rejected navigation outside page range");
            return Ok(Navigation::Rejected { requested: index });
        };
        debug!(index, from = request.from, to = request.to, "Loading trade page");

        let fetched = futures::try_join!(
            source.fetch_page(&self.filter, request),
            source.count_positions(&self.filter),
        );

        let (records, total_count) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                error!(index, error = %e, "Failed to load trade page");
                self.records.clear();
                self.last_error = Some(e.clone());
                return Err(PaginationError::DataSource(e));
            }
        };

        let window = PageWindow::new(index, size, total_count);
        if !window.contains(index) {
            warn!(
                requested = index,
                total_pages = window.total_pages,
                "Rejected navigation outside page range"
            );
            return Ok(Navigation::Rejected { requested: index });
        }

        self.window = Some(window);
        self.records = records;
        self.last_error = None;
        Ok(Navigation::Loaded)
    }
}
