//! Pure computation engine for the dashboard: aggregation, pagination,
//! time ranges and result memoization.

pub mod aggregator;
pub mod cache;
pub mod paginator;
pub mod range;

pub use aggregator::{
    aggregate_cumulative, aggregate_monthly, summarize, CumulativePoint, MonthlyBucket,
    PortfolioSummary, MONTH_NAMES,
};
pub use cache::ResultCache;
pub use paginator::{page_buttons, Navigation, PageWindow, PaginationError, Paginator};
pub use range::{Clock, FixedClock, RangeParseError, SystemClock, TimeRange};
