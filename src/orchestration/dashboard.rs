//! Dashboard views over a [`DataSource`]: one fetch, one computation, one
//! result per call.

use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{sort_chronological, Decimal, PositionRecord};
use crate::engine::{
    aggregate_cumulative, aggregate_monthly, summarize, Clock, CumulativePoint, MonthlyBucket,
    Navigation, PageWindow, PaginationError, Paginator, PortfolioSummary, ResultCache, TimeRange,
};
use crate::render::chart_scale;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Twelve-month chart data for one time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    pub range: TimeRange,
    pub buckets: Vec<MonthlyBucket>,
    pub total_pnl: Decimal,
    pub y_axis_max: Decimal,
}

/// The trade list as it stands after a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePage {
    pub records: Vec<PositionRecord>,
    pub window: Option<PageWindow>,
    pub buttons: Vec<u64>,
    pub navigation: Navigation,
}

pub struct Dashboard {
    source: Arc<dyn DataSource>,
    clock: Arc<dyn Clock>,
    summaries: ResultCache<TimeRange, PortfolioSummary>,
    /// Held for the whole fetch so navigations run one at a time.
    trades: Mutex<Paginator>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("source", &self.source)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn DataSource>,
        clock: Arc<dyn Clock>,
        page_size: u64,
    ) -> Result<Self, PaginationError> {
        Ok(Self {
            source,
            clock,
            summaries: ResultCache::new(),
            trades: Mutex::new(Paginator::new(page_size)?),
        })
    }

    async fn fetch(&self, range: TimeRange) -> Result<Vec<PositionRecord>, DataSourceError> {
        let filter = range.filter(self.clock.now());
        debug!(%range, since = ?filter.settled_since, "Fetching settled positions");

        self.source.fetch_positions(&filter).await.map_err(|e| {
            error!(%range, error = %e, "Failed to fetch settled positions");
            e
        })
    }

    /// Portfolio totals for `range`. Computed once per range, then served
    /// from the cache.
    pub async fn summary(&self, range: TimeRange) -> Result<PortfolioSummary, DataSourceError> {
        self.summaries
            .get_or_try_insert_with(range, || async move {
                let records = self.fetch(range).await?;
                let summary = summarize(&records);
                info!(
                    %range,
                    total_trades = summary.total_trades,
                    win_rate = summary.win_rate,
                    "Computed portfolio summary"
                );
                Ok::<_, DataSourceError>(summary)
            })
            .await
    }

    pub async fn monthly(&self, range: TimeRange) -> Result<MonthlyReport, DataSourceError> {
        let records = self.fetch(range).await?;
        let buckets = aggregate_monthly(&records);
        let total_pnl = buckets.iter().map(|b| b.total_pnl).sum();
        let y_axis_max = chart_scale(&buckets);

        Ok(MonthlyReport {
            range,
            buckets,
            total_pnl,
            y_axis_max,
        })
    }

    /// Running P/L over `range`, oldest settlement first.
    pub async fn cumulative(
        &self,
        range: TimeRange,
    ) -> Result<Vec<CumulativePoint>, DataSourceError> {
        let mut records = self.fetch(range).await?;
        sort_chronological(&mut records);
        Ok(aggregate_cumulative(&records))
    }

    /// Navigate the trade list to `page`, or reload the current page when
    /// `page` is `None`.
    ///
    /// An out-of-range page leaves the list as it was and reports
    /// [`Navigation::Rejected`].
    pub async fn trades_page(&self, page: Option<u64>) -> Result<TradePage, PaginationError> {
        let mut paginator = self.trades.lock().await;
        let index = page.unwrap_or_else(|| paginator.current_index());
        let size = paginator.page_size();

        let navigation = paginator.page(self.source.as_ref(), index, size).await?;
        let window = paginator.window();

        Ok(TradePage {
            records: paginator.records().to_vec(),
            window,
            buttons: window.map(|w| w.buttons()).unwrap_or_default(),
            navigation,
        })
    }
}
