//! Pure aggregation of settled positions into chart series and summaries.
//!
//! Every function here is deterministic over the slice it is given and
//! never reorders it.

use crate::domain::{Decimal, PositionRecord};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// Calendar-month display labels, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Total realized P/L for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub period_key: &'static str,
    pub total_pnl: Decimal,
}

/// One step of the running P/L total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
    pub index: usize,
    /// Settlement date of the record, `YYYY-MM-DD`.
    pub period_label: String,
    pub pnl: Decimal,
    pub cumulative_pnl: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_profit: Decimal,
    /// Percentage of winning trades, 0..=100, rounded half up.
    pub win_rate: u32,
    pub total_trades: u64,
}

/// Year-qualified grouping key (`"2024-Jan"` in display form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MonthKey {
    year: i32,
    month0: usize,
}

impl MonthKey {
    fn of(record: &PositionRecord) -> Self {
        MonthKey {
            year: record.settled_at.year(),
            month0: record.settled_at.month0() as usize,
        }
    }
}

/// Bucket realized P/L into the twelve calendar months.
///
/// Always returns exactly 12 buckets in Jan..Dec order; months without
/// records are zero. Records are grouped per year first, then the year is
/// folded away, so the same month of different years lands in one bucket.
pub fn aggregate_monthly(records: &[PositionRecord]) -> Vec<MonthlyBucket> {
    let mut by_month: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    for record in records {
        *by_month.entry(MonthKey::of(record)).or_default() += record.pnl();
    }

    let mut totals = [Decimal::zero(); 12];
    for (key, total) in by_month {
        totals[key.month0] += total;
    }

    MONTH_NAMES
        .iter()
        .zip(totals)
        .map(|(&name, total_pnl)| MonthlyBucket {
            period_key: name,
            total_pnl,
        })
        .collect()
}

/// Running total of realized P/L, one point per record.
///
/// Callers must pass records sorted by `settled_at` ascending; the given
/// order is used as-is.
pub fn aggregate_cumulative(records: &[PositionRecord]) -> Vec<CumulativePoint> {
    let mut running = Decimal::zero();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let pnl = record.pnl();
            running += pnl;
            CumulativePoint {
                index,
                period_label: record.settled_at.format("%Y-%m-%d").to_string(),
                pnl,
                cumulative_pnl: running,
            }
        })
        .collect()
}

pub fn summarize(records: &[PositionRecord]) -> PortfolioSummary {
    let total_trades = records.len() as u64;
    let wins = records.iter().filter(|r| r.is_win()).count() as u64;
    let total_profit: Decimal = records.iter().map(PositionRecord::pnl).sum();

    PortfolioSummary {
        total_profit,
        win_rate: win_rate(wins, total_trades),
        total_trades,
    }
}

/// `round(100 * wins / total)` in integer arithmetic; 0 for no trades.
fn win_rate(wins: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * wins + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sort_chronological, Ticker};
    use chrono::{TimeZone, Utc};

    fn make_record(pnl: i64, y: i32, m: u32, d: u32) -> PositionRecord {
        PositionRecord::new(
            Ticker::new(format!("T-{}-{}-{}", y, m, d)),
            "",
            pnl,
            Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        )
    }

    fn scenario() -> Vec<PositionRecord> {
        vec![
            make_record(25000, 2024, 1, 15),
            make_record(-5000, 2024, 1, 20),
            make_record(10000, 2024, 2, 1),
        ]
    }

    fn dollars(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_monthly_scenario() {
        let buckets = aggregate_monthly(&scenario());

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].total_pnl, dollars("200.00"));
        assert_eq!(buckets[1].total_pnl, dollars("100.00"));
        assert!(buckets[2..].iter().all(|b| b.total_pnl.is_zero()));
    }

    #[test]
    fn test_summary_scenario() {
        let summary = summarize(&scenario());
        assert_eq!(summary.total_profit, dollars("300.00"));
        assert_eq!(summary.win_rate, 67);
        assert_eq!(summary.total_trades, 3);
    }

    #[test]
    fn test_monthly_labels_fixed_regardless_of_input() {
        let labels = |records: &[PositionRecord]| -> Vec<&'static str> {
            aggregate_monthly(records)
                .iter()
                .map(|b| b.period_key)
                .collect()
        };

        let mut reversed = scenario();
        reversed.reverse();

        assert_eq!(labels(&Vec::new()), MONTH_NAMES.to_vec());
        assert_eq!(labels(&scenario()), MONTH_NAMES.to_vec());
        assert_eq!(labels(&reversed), MONTH_NAMES.to_vec());
        assert_eq!(aggregate_monthly(&reversed), aggregate_monthly(&scenario()));
    }

    #[test]
    fn test_monthly_sum_matches_summary_within_one_year() {
        let records = vec![
            make_record(1234, 2023, 3, 1),
            make_record(-999, 2023, 7, 4),
            make_record(50, 2023, 12, 31),
            make_record(-1, 2023, 7, 5),
        ];
        let monthly_total: Decimal = aggregate_monthly(&records)
            .iter()
            .map(|b| b.total_pnl)
            .sum();
        assert_eq!(monthly_total, summarize(&records).total_profit);
    }

    #[test]
    fn test_monthly_folds_years_into_one_bucket() {
        let records = vec![make_record(100, 2023, 3, 1), make_record(200, 2024, 3, 1)];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets[2].total_pnl, dollars("3"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_monthly(&[])
            .iter()
            .all(|b| b.total_pnl.is_zero()));
        assert!(aggregate_cumulative(&[]).is_empty());
        assert_eq!(
            summarize(&[]),
            PortfolioSummary {
                total_profit: Decimal::zero(),
                win_rate: 0,
                total_trades: 0,
            }
        );
    }

    #[test]
    fn test_cumulative_running_total() {
        let mut records = scenario();
        records.reverse();
        sort_chronological(&mut records);

        let series = aggregate_cumulative(&records);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].period_label, "2024-01-15");
        assert_eq!(series[0].cumulative_pnl, dollars("250"));
        assert_eq!(series[1].cumulative_pnl, dollars("200"));
        assert_eq!(series[2].cumulative_pnl, dollars("300"));
        assert_eq!(
            series.last().unwrap().cumulative_pnl,
            summarize(&records).total_profit
        );
        for (i, point) in series.iter().enumerate() {
            assert_eq!(point.index, i);
        }
    }

    #[test]
    fn test_cumulative_keeps_given_order() {
        let records = vec![make_record(100, 2024, 2, 1), make_record(-300, 2024, 1, 1)];
        let series = aggregate_cumulative(&records);
        assert_eq!(series[0].period_label, "2024-02-01");
        assert_eq!(series[1].cumulative_pnl, dollars("-2"));
    }

    #[test]
    fn test_win_rate_rounding_and_bounds() {
        assert_eq!(win_rate(0, 0), 0);
        assert_eq!(win_rate(1, 3), 33);
        assert_eq!(win_rate(2, 3), 67);
        assert_eq!(win_rate(1, 8), 13); // 12.5 rounds up
        assert_eq!(win_rate(0, 5), 0);
        assert_eq!(win_rate(5, 5), 100);

        for total in 1..=50u64 {
            for wins in 0..=total {
                assert!(win_rate(wins, total) <= 100);
            }
        }
    }

    #[test]
    fn test_break_even_trades_count_but_do_not_win() {
        let records = vec![make_record(0, 2024, 1, 1), make_record(100, 2024, 1, 2)];
        let summary = summarize(&records);
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.win_rate, 50);
    }
}
