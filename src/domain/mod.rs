//! Domain types for settled prediction-market positions.
//!
//! This module provides:
//! - Lossless money handling via the Decimal wrapper
//! - The Ticker primitive and the PositionRecord value type
//! - Stable ordering keys for chronological and trade-list order

pub mod decimal;
pub mod ordering;
pub mod position;
pub mod primitives;

pub use decimal::Decimal;
pub use ordering::{sort_chronological, sort_for_page};
pub use position::{parse_settled_at, PositionRecord};
pub use primitives::Ticker;
