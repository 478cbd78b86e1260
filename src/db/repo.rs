//! Repository over the local `settled_positions` table.

use crate::datasource::{DataSource, DataSourceError, PageRequest, PositionFilter};
use crate::domain::{PositionRecord, Ticker};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

/// Repository for settled positions stored in SQLite.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Insert a single settled position.
    pub async fn insert_position(&self, position: &PositionRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settled_positions (ticker, market_name, realized_pnl, settled_at_ms)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(position.ticker.as_str())
        .bind(&position.market_name)
        .bind(position.realized_pnl)
        .bind(position.settled_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert many positions in one transaction. Returns the number inserted.
    pub async fn insert_positions_batch(
        &self,
        positions: &[PositionRecord],
    ) -> Result<usize, sqlx::Error> {
        if positions.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for position in positions {
            sqlx::query(
                r#"
                INSERT INTO settled_positions (ticker, market_name, realized_pnl, settled_at_ms)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(position.ticker.as_str())
            .bind(&position.market_name)
            .bind(position.realized_pnl)
            .bind(position.settled_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(positions.len())
    }
}

fn since_ms(filter: &PositionFilter) -> Option<i64> {
    filter.settled_since.map(|t| t.timestamp_millis())
}

fn row_to_position(row: &SqliteRow) -> Result<PositionRecord, DataSourceError> {
    let ticker: String = row.try_get("ticker")?;
    let market_name: String = row.try_get("market_name")?;
    let realized_pnl: i64 = row.try_get("realized_pnl")?;
    let settled_at_ms: i64 = row.try_get("settled_at_ms")?;

    let settled_at = DateTime::<Utc>::from_timestamp_millis(settled_at_ms).ok_or_else(|| {
        DataSourceError::ParseError(format!(
            "settled_at_ms out of range for {}: {}",
            ticker, settled_at_ms
        ))
    })?;

    Ok(PositionRecord::new(
        Ticker::new(ticker),
        market_name,
        realized_pnl,
        settled_at,
    ))
}

#[async_trait]
impl DataSource for Repository {
    async fn fetch_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        let since = since_ms(filter);
        debug!(?since, "Querying settled positions");

        let rows = sqlx::query(
            r#"
            SELECT ticker, market_name, realized_pnl, settled_at_ms
            FROM settled_positions
            WHERE (?1 IS NULL OR settled_at_ms >= ?1)
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_position).collect()
    }

    async fn fetch_page(
        &self,
        filter: &PositionFilter,
        page: PageRequest,
    ) -> Result<Vec<PositionRecord>, DataSourceError> {
        let since = since_ms(filter);
        debug!(?since, from = page.from, to = page.to, "Querying settled positions page");

        let rows = sqlx::query(
            r#"
            SELECT ticker, market_name, realized_pnl, settled_at_ms
            FROM settled_positions
            WHERE (?1 IS NULL OR settled_at_ms >= ?1)
            ORDER BY settled_at_ms DESC, ticker ASC, id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(since)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.from).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_position).collect()
    }

    async fn count_positions(&self, filter: &PositionFilter) -> Result<u64, DataSourceError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM settled_positions
            WHERE (?1 IS NULL OR settled_at_ms >= ?1)
            "#,
        )
        .bind(since_ms(filter))
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }
}
