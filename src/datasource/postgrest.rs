//! PostgREST (Supabase REST) client for the hosted settled-positions table.

use super::{DataSource, DataSourceError, PageRequest, PositionFilter};
use crate::domain::{parse_settled_at, PositionRecord, Ticker};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::SecondsFormat;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, RequestBuilder, Response};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const SELECT_COLUMNS: &str = "ticker,market_name,realized_pnl,last_updated_ts";
const PAGE_ORDER: &str = "last_updated_ts.desc,ticker.asc";
/// Oldest first, so rows settling mid-fetch land after the current offset.
const FULL_FETCH_ORDER: &str = "last_updated_ts.asc,ticker.asc";
/// Rows requested per round trip of a full fetch. The server may cap a
/// response below this (`max_rows`).
const FETCH_BATCH: u64 = 1000;

/// Data source backed by a PostgREST endpoint (`{base_url}/rest/v1/{table}`).
#[derive(Clone)]
pub struct PostgrestDataSource {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for PostgrestDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestDataSource")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl PostgrestDataSource {
    /// Create a new PostgREST data source.
    pub fn new(base_url: String, api_key: String, table: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send a request, retrying transient failures (network, 429, 5xx).
    async fn send<F>(&self, build: F) -> Result<Response, DataSourceError>
    where
        F: Fn() -> RequestBuilder,
    {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let build = &build;
        retry(backoff, || async move {
            let response = build().send().await.map_err(|e| {
                backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            Ok(response)
        })
        .await
    }

    async fn fetch_rows(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        let url = self.table_url();
        let response = self
            .send(|| self.authorized(self.client.get(&url)).query(&query))
            .await?;

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;

        let rows = body
            .as_array()
            .ok_or_else(|| DataSourceError::ParseError("Expected array response".to_string()))?;

        rows.iter().map(parse_position).collect()
    }
}

fn filter_params(filter: &PositionFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(since) = filter.settled_since {
        params.push((
            "last_updated_ts",
            format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ));
    }
    params
}

#[async_trait]
impl DataSource for PostgrestDataSource {
    async fn fetch_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        debug!(table = %self.table, ?filter, "Fetching settled positions");

        let filter_query = filter_params(filter);
        collect_pages(FETCH_BATCH, |page| {
            let mut query = vec![
                ("select", SELECT_COLUMNS.to_string()),
                ("order", FULL_FETCH_ORDER.to_string()),
                ("offset", page.from.to_string()),
                ("limit", page.limit().to_string()),
            ];
            query.extend(filter_query.iter().cloned());
            self.fetch_rows(query)
        })
        .await
    }

    async fn fetch_page(
        &self,
        filter: &PositionFilter,
        page: PageRequest,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        debug!(
            table = %self.table,
            from = page.from,
            to = page.to,
            "Fetching settled positions page"
        );

        let mut query = vec![
            ("select", SELECT_COLUMNS.to_string()),
            ("order", PAGE_ORDER.to_string()),
            ("offset", page.from.to_string()),
            ("limit", page.limit().to_string()),
        ];
        query.extend(filter_params(filter));
        self.fetch_rows(query).await
    }

    async fn count_positions(&self, filter: &PositionFilter) -> Result<u64, DataSourceError> {
        debug!(table = %self.table, ?filter, "Counting settled positions");

        let url = self.table_url();
        let mut query = vec![("select", "ticker".to_string())];
        query.extend(filter_params(filter));

        let response = self
            .send(|| {
                self.authorized(self.client.head(&url))
                    .header("Prefer", "count=exact")
                    .query(&query)
            })
            .await?;

        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DataSourceError::ParseError("Missing Content-Range header".to_string()))?;

        parse_content_range_total(content_range)
    }
}

/// Drain a windowed query from offset 0 until a window comes back empty.
///
/// The next window starts after the rows actually received, so a server
/// returning fewer than `batch` rows per response still yields every row.
/// Any failed window fails the whole fetch.
async fn collect_pages<F, Fut>(
    batch: u64,
    mut fetch: F,
) -> Result<Vec<PositionRecord>, DataSourceError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<PositionRecord>, DataSourceError>>,
{
    let mut positions = Vec::new();
    let mut from = 0u64;
    loop {
        let rows = fetch(PageRequest {
            from,
            to: from + batch - 1,
        })
        .await?;
        if rows.is_empty() {
            debug!(rows = positions.len(), "Full fetch complete");
            return Ok(positions);
        }
        from += rows.len() as u64;
        positions.extend(rows);
    }
}

/// Extract the total from a PostgREST `Content-Range` value (`0-4/12`, `*/0`).
fn parse_content_range_total(value: &str) -> Result<u64, DataSourceError> {
    let total = value
        .rsplit_once('/')
        .map(|(_, total)| total.trim())
        .ok_or_else(|| {
            DataSourceError::ParseError(format!("Invalid Content-Range: {}", value))
        })?;

    total.parse::<u64>().map_err(|_| {
        DataSourceError::ParseError(format!("Content-Range has no exact total: {}", value))
    })
}

fn parse_position(row: &serde_json::Value) -> Result<PositionRecord, DataSourceError> {
    let ticker = row
        .get("ticker")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing ticker field".to_string()))?;

    let market_name = row
        .get("market_name")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    let realized_pnl = match row.get("realized_pnl") {
        Some(v) if v.is_i64() => v.as_i64(),
        Some(v) => v.as_str().and_then(|s| s.trim().parse::<i64>().ok()),
        None => None,
    }
    .ok_or_else(|| {
        DataSourceError::ParseError(format!("Invalid realized_pnl for {}", ticker))
    })?;

    let settled_str = row
        .get("last_updated_ts")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing last_updated_ts field".to_string()))?;
    let settled_at = parse_settled_at(settled_str)
        .map_err(|e| DataSourceError::ParseError(format!("Invalid last_updated_ts: {}", e)))?;

    Ok(PositionRecord::new(
        Ticker::new(ticker),
        market_name,
        realized_pnl,
        settled_at,
    ))
}
