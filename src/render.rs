//! Display formatting for money amounts and chart axes.
//!
//! Negative amounts always put the sign before the currency symbol
//! (`-$50`, never `$-50`).

use crate::domain::{Decimal, PositionRecord};
use crate::engine::MonthlyBucket;
use serde::Serialize;

/// Chart axis ticks come in steps of this many dollars.
const SCALE_STEP: i64 = 5;

fn sign_prefix(negative: bool) -> &'static str {
    if negative {
        "-$"
    } else {
        "$"
    }
}

/// Insert `,` every three digits of a plain integer string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `$1,284.75`, `-$50`, `$0.5`: thousands separators, at most two fraction
/// digits, trailing zeros dropped.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let plain = rounded.abs().to_canonical_string();
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut out = String::from(sign_prefix(rounded.is_negative()));
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Bar labels: `$1.23K` from a thousand upwards, otherwise `$12.00`.
pub fn format_compact(value: Decimal) -> String {
    let magnitude = value.abs();
    let prefix = sign_prefix(value.is_negative());
    let thousand = Decimal::from(1000);

    if magnitude >= thousand {
        format!("{}{}K", prefix, (magnitude / thousand).to_fixed_string(2))
    } else {
        format!("{}{}", prefix, magnitude.to_fixed_string(2))
    }
}

/// Symmetric y-axis bound for the monthly chart.
///
/// `ceil(max(|max|, |min|, 1) / 5) * 5`, so an all-zero year still gets a
/// non-degenerate axis of 5.
pub fn chart_scale(buckets: &[MonthlyBucket]) -> Decimal {
    let step = Decimal::from(SCALE_STEP);
    let peak = buckets
        .iter()
        .map(|b| b.total_pnl.abs())
        .fold(Decimal::from(1), Decimal::max);

    (peak / step).ceil() * step
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn of(record: &PositionRecord) -> Self {
        if record.is_win() {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
        }
    }
}

/// `Win $250` / `Loss $50`. Zero P/L counts as a loss.
pub fn outcome_label(record: &PositionRecord) -> String {
    format!(
        "{} {}",
        Outcome::of(record).as_str(),
        format_currency(record.pnl().abs())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticker;
    use crate::engine::MONTH_NAMES;
    use chrono::{TimeZone, Utc};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn buckets(values: &[&str]) -> Vec<MonthlyBucket> {
        values
            .iter()
            .zip(MONTH_NAMES)
            .map(|(v, name)| MonthlyBucket {
                period_key: name,
                total_pnl: d(v),
            })
            .collect()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(d("1284.75")), "$1,284.75");
        assert_eq!(format_currency(d("-50")), "-$50");
        assert_eq!(format_currency(d("-50.00")), "-$50");
        assert_eq!(format_currency(d("0")), "$0");
        assert_eq!(format_currency(d("0.5")), "$0.5");
        assert_eq!(format_currency(d("1234567.891")), "$1,234,567.89");
        assert_eq!(format_currency(d("999")), "$999");
        assert_eq!(format_currency(d("-1000")), "-$1,000");
    }

    #[test]
    fn test_format_currency_tiny_negative_rounds_to_zero() {
        assert_eq!(format_currency(d("-0.001")), "$0");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(d("1234")), "$1.23K");
        assert_eq!(format_compact(d("-1234")), "-$1.23K");
        assert_eq!(format_compact(d("1000")), "$1.00K");
        assert_eq!(format_compact(d("12")), "$12.00");
        assert_eq!(format_compact(d("-999.99")), "-$999.99");
        assert_eq!(format_compact(d("0")), "$0.00");
    }

    #[test]
    fn test_chart_scale() {
        assert_eq!(chart_scale(&buckets(&["200", "100"])), d("200"));
        assert_eq!(chart_scale(&buckets(&["12", "-31.5"])), d("35"));
        assert_eq!(chart_scale(&buckets(&["0"; 12])), d("5"));
        assert_eq!(chart_scale(&[]), d("5"));
    }

    #[test]
    fn test_outcome_label() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let win = PositionRecord::new(Ticker::new("A"), "", 25000, at);
        let loss = PositionRecord::new(Ticker::new("B"), "", -5050, at);
        let flat = PositionRecord::new(Ticker::new("C"), "", 0, at);

        assert_eq!(outcome_label(&win), "Win $250");
        assert_eq!(outcome_label(&loss), "Loss $50.5");
        assert_eq!(outcome_label(&flat), "Loss $0");
        assert_eq!(Outcome::of(&win), Outcome::Win);
    }
}
