//! Data source abstraction over the table of settled positions.

use crate::domain::PositionRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

pub mod mock;
pub mod postgrest;

pub use mock::MockDataSource;
pub use postgrest::PostgrestDataSource;

/// Row predicate applied to every query. The same filter must be used for a
/// page fetch and its matching count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PositionFilter {
    /// Inclusive lower bound on `settled_at`; `None` means no predicate.
    pub settled_since: Option<DateTime<Utc>>,
}

impl PositionFilter {
    /// No predicate: every settled position.
    pub fn all() -> Self {
        Self::default()
    }

    /// Positions settled at or after `since`.
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            settled_since: Some(since),
        }
    }

    pub fn matches(&self, record: &PositionRecord) -> bool {
        match self.settled_since {
            Some(since) => record.settled_at >= since,
            None => true,
        }
    }
}

/// Inclusive row window over the trade-list order
/// (`settled_at` descending, then `ticker` ascending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based offset of the first row.
    pub from: u64,
    /// Zero-based offset of the last row, inclusive.
    pub to: u64,
}

impl PageRequest {
    /// Maximum number of rows this request can return.
    pub fn limit(&self) -> u64 {
        self.to - self.from + 1
    }
}

/// Query capability over settled positions.
///
/// A call returns either the complete result or an error; there is no
/// partial-success shape.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Fetch every position matching `filter`, in no particular order.
    async fn fetch_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<PositionRecord>, DataSourceError>;

    /// Fetch one window of the trade list.
    ///
    /// # Returns
    /// At most `page.limit()` records, ordered by settled_at descending then
    /// ticker ascending. Rows past the end of the table are simply absent.
    async fn fetch_page(
        &self,
        filter: &PositionFilter,
        page: PageRequest,
    ) -> Result<Vec<PositionRecord>, DataSourceError>;

    /// Exact number of rows matching `filter`.
    async fn count_positions(&self, filter: &PositionFilter) -> Result<u64, DataSourceError>;
}

/// Error type for data source operations. The message is opaque to the
/// engine; it is only carried through to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 4xx rejected query, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON, malformed row, bad Content-Range)
    ParseError(String),
    /// Query failure reported by a database backend
    QueryError(String),
    /// Rate limit exceeded after retries
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::QueryError(msg) => write!(f, "Query error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<sqlx::Error> for DataSourceError {
    fn from(err: sqlx::Error) -> Self {
        DataSourceError::QueryError(err.to_string())
    }
}
