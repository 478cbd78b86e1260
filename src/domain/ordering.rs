//! Stable position ordering.
//!
//! The data source makes no ordering promise, so every consumer that needs
//! one imposes it through the keys here.

use crate::domain::PositionRecord;
use std::cmp::{Ordering, Reverse};

/// Chronological key: settled_at ascending, then ticker ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ChronologicalKey<'a> {
    settled_at_ms: i64,
    ticker: &'a str,
}

impl<'a> ChronologicalKey<'a> {
    fn from_record(record: &'a PositionRecord) -> Self {
        ChronologicalKey {
            settled_at_ms: record.settled_at.timestamp_millis(),
            ticker: record.ticker.as_str(),
        }
    }
}

/// Trade-list key: settled_at descending, then ticker ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PageOrderingKey<'a> {
    settled_at_ms: Reverse<i64>,
    ticker: &'a str,
}

impl<'a> PageOrderingKey<'a> {
    fn from_record(record: &'a PositionRecord) -> Self {
        PageOrderingKey {
            settled_at_ms: Reverse(record.settled_at.timestamp_millis()),
            ticker: record.ticker.as_str(),
        }
    }
}

/// Compare two records the way the trade list orders them.
pub fn page_order(a: &PositionRecord, b: &PositionRecord) -> Ordering {
    PageOrderingKey::from_record(a).cmp(&PageOrderingKey::from_record(b))
}

/// Sort records oldest first. Cumulative series require this order.
pub fn sort_chronological(records: &mut [PositionRecord]) {
    records.sort_by(|a, b| {
        let key_a = ChronologicalKey::from_record(a);
        let key_b = ChronologicalKey::from_record(b);
        key_a.cmp(&key_b)
    });
}

/// Sort records newest first, ticker breaking timestamp ties.
pub fn sort_for_page(records: &mut [PositionRecord]) {
    records.sort_by(page_order);
}
