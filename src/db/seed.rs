//! CSV seeding for the local positions database.
//!
//! Expected header: `ticker,market_name,realized_pnl,settled_at`, with
//! `realized_pnl` in cents and `settled_at` as RFC 3339 or Postgres text.

use super::Repository;
use crate::domain::{parse_settled_at, PositionRecord, Ticker};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {message}")]
    Io { path: String, message: String },
    #[error("csv parse error at row {row}: {message}")]
    Csv { row: usize, message: String },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub fn parse_positions_csv(csv_bytes: &[u8]) -> Result<Vec<PositionRecord>, SeedError> {
    #[derive(Debug, serde::Deserialize)]
    struct Row {
        ticker: String,
        #[serde(default)]
        market_name: String,
        realized_pnl: i64,
        settled_at: String,
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_bytes);

    let mut positions = Vec::new();
    for (i, record) in reader.deserialize::<Row>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let row = record.map_err(|e| SeedError::Csv {
            row: line,
            message: e.to_string(),
        })?;
        let settled_at = parse_settled_at(&row.settled_at).map_err(|e| SeedError::Csv {
            row: line,
            message: format!("invalid settled_at {:?}: {}", row.settled_at, e),
        })?;

        positions.push(PositionRecord::new(
            Ticker::new(row.ticker),
            row.market_name,
            row.realized_pnl,
            settled_at,
        ));
    }

    Ok(positions)
}

/// Read `path` and insert every row into `repo` in one transaction.
pub async fn load_csv_file(repo: &Repository, path: &str) -> Result<usize, SeedError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| SeedError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    let positions = parse_positions_csv(&bytes)?;
    let inserted = repo.insert_positions_batch(&positions).await?;

    info!(path = %path, inserted, "Seeded settled positions");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{DataSource, PositionFilter};
    use crate::db::init_db;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &[u8] = b"ticker,market_name,realized_pnl,settled_at
KXOSCAR-A, Best Picture ,25000,2024-01-15T10:00:00Z
KXOSCAR-B,Best Actor,-5000,2024-01-20 08:00:00.000000+00
";

    #[test]
    fn test_parse_valid_rows() {
        let positions = parse_positions_csv(SAMPLE).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].ticker.as_str(), "KXOSCAR-A");
        assert_eq!(positions[0].market_name, "Best Picture");
        assert_eq!(positions[0].realized_pnl, 25000);
        assert_eq!(
            positions[1].settled_at,
            Utc.with_ymd_and_hms(2024, 1, 20, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_reports_row_number() {
        let csv = b"ticker,market_name,realized_pnl,settled_at
A,x,10,2024-01-01T00:00:00Z
B,y,ten,2024-01-01T00:00:00Z
";
        match parse_positions_csv(csv) {
            Err(SeedError::Csv { row, .. }) => assert_eq!(row, 3),
            other => panic!("Expected Csv error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_timestamp() {
        let csv = b"ticker,market_name,realized_pnl,settled_at\nA,x,10,yesterday\n";
        assert!(matches!(
            parse_positions_csv(csv),
            Err(SeedError::Csv { row: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_load_csv_file_inserts_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("seed.db").to_string_lossy().to_string();
        let repo = Repository::new(init_db(&db_path).await.unwrap());

        let csv_path = temp_dir.path().join("positions.csv");
        std::fs::File::create(&csv_path)
            .unwrap()
            .write_all(SAMPLE)
            .unwrap();

        let inserted = load_csv_file(&repo, &csv_path.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(repo.count_positions(&PositionFilter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("seed.db").to_string_lossy().to_string();
        let repo = Repository::new(init_db(&db_path).await.unwrap());

        let err = load_csv_file(&repo, "/definitely/not/here.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
