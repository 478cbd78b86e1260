//! Domain primitives: Ticker.

use serde::{Deserialize, Serialize};

/// Market ticker (e.g. "KXOSCARPIC-25-ANO").
///
/// Not unique across time: the same market can settle more than one position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(pub String);

impl Ticker {
    /// Create a Ticker from a string.
    pub fn new(ticker: impl Into<String>) -> Self {
        Ticker(ticker.into())
    }

    /// Get the ticker as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
