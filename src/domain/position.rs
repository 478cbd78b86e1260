//! Settled position record, the unit fetched from a data source.

use super::{Decimal, Ticker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed trade with its final realized profit/loss.
///
/// Records are immutable once fetched; nothing in the engine mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub ticker: Ticker,
    /// Human-readable market label, display only.
    pub market_name: String,
    /// Signed realized P/L in cents.
    pub realized_pnl: i64,
    pub settled_at: DateTime<Utc>,
}

impl PositionRecord {
    pub fn new(
        ticker: Ticker,
        market_name: impl Into<String>,
        realized_pnl: i64,
        settled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker,
            market_name: market_name.into(),
            realized_pnl,
            settled_at,
        }
    }

    /// Realized P/L in display currency.
    pub fn pnl(&self) -> Decimal {
        Decimal::from_cents(self.realized_pnl)
    }

    /// A win is a strictly positive realized P/L; break-even counts as a loss.
    pub fn is_win(&self) -> bool {
        self.realized_pnl > 0
    }
}

/// Parse a settlement timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T10:00:00Z`) and the Postgres text form
/// (`2024-01-15 10:00:00.123456+00`).
pub fn parse_settled_at(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|t| t.with_timezone(&Utc))
}
