//! Mock data source for testing without network calls.

use super::{DataSource, DataSourceError, PageRequest, PositionFilter};
use crate::domain::{ordering, PositionRecord};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory data source. Clones share the call counter and failure switch,
/// so a test can keep a handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    positions: Vec<PositionRecord>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a position to the mock data source.
    pub fn with_position(mut self, position: PositionRecord) -> Self {
        self.positions.push(position);
        self
    }

    /// Add multiple positions to the mock data source.
    pub fn with_positions(mut self, positions: Vec<PositionRecord>) -> Self {
        self.positions.extend(positions);
        self
    }

    /// Make every subsequent query fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total number of queries served or refused so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataSourceError::NetworkError(
                "mock data source unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn matching(&self, filter: &PositionFilter) -> Vec<PositionRecord> {
        self.positions
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        self.begin_call()?;
        Ok(self.matching(filter))
    }

    async fn fetch_page(
        &self,
        filter: &PositionFilter,
        page: PageRequest,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        self.begin_call()?;
        let mut rows = self.matching(filter);
        ordering::sort_for_page(&mut rows);

        Ok(rows
            .into_iter()
            .skip(page.from as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn count_positions(&self, filter: &PositionFilter) -> Result<u64, DataSourceError> {
        self.begin_call()?;
        Ok(self.matching(filter).len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticker;
    use chrono::{TimeZone, Utc};

    fn make_position(ticker: &str, day: u32, pnl: i64) -> PositionRecord {
        PositionRecord::new(
            Ticker::new(ticker),
            format!("Market {}", ticker),
            pnl,
            Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
        )
    }

    fn make_mock() -> MockDataSource {
        MockDataSource::new().with_positions(vec![
            make_position("A", 1, 100),
            make_position("B", 2, -50),
            make_position("C", 3, 75),
        ])
    }

    #[tokio::test]
    async fn test_mock_fetch_positions_filtered() {
        let mock = make_mock();
        let since = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let rows = mock
            .fetch_positions(&PositionFilter::since(since))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_fetch_page_newest_first() {
        let mock = make_mock();
        let rows = mock
            .fetch_page(&PositionFilter::all(), PageRequest { from: 0, to: 1 })
            .await
            .unwrap();
        let tickers: Vec<_> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["C", "B"]);
    }

    #[tokio::test]
    async fn test_mock_fetch_page_past_end_is_short() {
        let mock = make_mock();
        let rows = mock
            .fetch_page(&PositionFilter::all(), PageRequest { from: 2, to: 3 })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker.as_str(), "A");
    }

    #[tokio::test]
    async fn test_mock_failure_switch_and_call_count() {
        let mock = make_mock();
        let handle = mock.clone();

        assert_eq!(mock.count_positions(&PositionFilter::all()).await.unwrap(), 3);
        handle.set_failing(true);
        assert!(mock.count_positions(&PositionFilter::all()).await.is_err());
        handle.set_failing(false);
        assert!(mock.fetch_positions(&PositionFilter::all()).await.is_ok());

        assert_eq!(handle.calls(), 3);
    }
}
