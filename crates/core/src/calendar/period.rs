//! Monthly period generation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Status of a financial period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodStatus {
    /// Period is open for postings.
    Open,
    /// Period is closed, no new postings allowed.
    Closed,
}

/// A generated period within a financial year, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPeriod {
    /// Sequence number within the year, starting at 1.
    pub period_no: i32,
    /// Human-readable name, e.g. "April 2025".
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Always `Open` for freshly generated periods.
    pub status: PeriodStatus,
}

/// Lazy iterator of monthly periods tiling an inclusive date range.
///
/// Each period runs from its start to the last day of that calendar month,
/// except the final period which is truncated to the range's end date. The
/// iterator is finite and can be recreated from the same inputs at any time.
#[derive(Debug, Clone)]
pub struct Periods {
    current: NaiveDate,
    end: NaiveDate,
    period_no: i32,
}

impl Iterator for Periods {
    type Item = GeneratedPeriod;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.end {
            return None;
        }

        let month_end = last_day_of_month(self.current.year(), self.current.month());
        let period_end = if month_end > self.end {
            self.end
        } else {
            month_end
        };

        let period = GeneratedPeriod {
            period_no: self.period_no,
            name: format!("{} {}", month_name(self.current.month()), self.current.year()),
            start_date: self.current,
            end_date: period_end,
            status: PeriodStatus::Open,
        };

        self.current = period_end + Duration::days(1);
        self.period_no += 1;

        Some(period)
    }
}

/// Generates the monthly periods covering `[start, end]`.
#[must_use]
pub fn generate_periods(start: NaiveDate, end: NaiveDate) -> Periods {
    Periods {
        current: start,
        end,
        period_no: 1,
    }
}

/// Returns the last day of a month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .unwrap()
        .pred_opt()
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap())
}

/// Returns the English month name.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_fiscal_year_apr_mar() {
        let periods: Vec<_> =
            generate_periods(date(2025, 4, 1), date(2026, 3, 31)).collect();

        assert_eq!(periods.len(), 12);

        assert_eq!(periods[0].name, "April 2025");
        assert_eq!(periods[0].period_no, 1);
        assert_eq!(periods[0].start_date, date(2025, 4, 1));
        assert_eq!(periods[0].end_date, date(2025, 4, 30));
        assert_eq!(periods[0].status, PeriodStatus::Open);

        assert_eq!(periods[11].name, "March 2026");
        assert_eq!(periods[11].period_no, 12);
        assert_eq!(periods[11].start_date, date(2026, 3, 1));
        assert_eq!(periods[11].end_date, date(2026, 3, 31));
    }

    #[test]
    fn test_last_period_truncated_to_year_end() {
        let periods: Vec<_> =
            generate_periods(date(2025, 1, 15), date(2025, 3, 20)).collect();

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].start_date, date(2025, 1, 15));
        assert_eq!(periods[0].end_date, date(2025, 1, 31));
        assert_eq!(periods[2].start_date, date(2025, 3, 1));
        assert_eq!(periods[2].end_date, date(2025, 3, 20));
    }

    #[test]
    fn test_single_day_range() {
        let periods: Vec<_> =
            generate_periods(date(2025, 6, 10), date(2025, 6, 10)).collect();

        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start_date, date(2025, 6, 10));
        assert_eq!(periods[0].end_date, date(2025, 6, 10));
        assert_eq!(periods[0].name, "June 2025");
    }

    #[test]
    fn test_iterator_is_restartable() {
        let first: Vec<_> = generate_periods(date(2025, 4, 1), date(2026, 3, 31)).collect();
        let second: Vec<_> = generate_periods(date(2025, 4, 1), date(2026, 3, 31)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2025, 1), date(2025, 1, 31));
        assert_eq!(last_day_of_month(2025, 2), date(2025, 2, 28));
        assert_eq!(last_day_of_month(2024, 2), date(2024, 2, 29)); // Leap year
        assert_eq!(last_day_of_month(2025, 4), date(2025, 4, 30));
        assert_eq!(last_day_of_month(2025, 12), date(2025, 12, 31));
    }
}

/// Property-based tests for period tiling.
#[cfg(test)]
mod props {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..=2035, 1u32..=12, 1u32..=28)
            .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    fn valid_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
        date_strategy().prop_flat_map(|start| {
            (Just(start), 0i64..=800)
                .prop_map(move |(s, days)| (s, s + chrono::Duration::days(days)))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The union of generated periods exactly covers [start, end]:
        /// the first period starts at `start`, the last ends at `end`, and
        /// each period starts the day after its predecessor ends.
        #[test]
        fn prop_periods_tile_range((start, end) in valid_range()) {
            let periods: Vec<_> = generate_periods(start, end).collect();

            prop_assert!(!periods.is_empty());
            prop_assert_eq!(periods[0].start_date, start);
            prop_assert_eq!(periods[periods.len() - 1].end_date, end);

            for window in periods.windows(2) {
                prop_assert_eq!(
                    window[1].start_date,
                    window[0].end_date + chrono::Duration::days(1),
                    "periods must be contiguous"
                );
            }
        }

        /// Every period is bounded within a single calendar month, and all
        /// but possibly the last end on the month's final day.
        #[test]
        fn prop_periods_are_month_bounded((start, end) in valid_range()) {
            let periods: Vec<_> = generate_periods(start, end).collect();

            for (idx, period) in periods.iter().enumerate() {
                prop_assert_eq!(period.start_date.year(), period.end_date.year());
                prop_assert_eq!(period.start_date.month(), period.end_date.month());

                if idx + 1 < periods.len() {
                    let next_day = period.end_date + chrono::Duration::days(1);
                    prop_assert_eq!(next_day.day(), 1, "non-final periods end the month");
                }
            }
        }

        /// Sequence numbers increment from 1 without gaps.
        #[test]
        fn prop_sequence_numbers_are_dense((start, end) in valid_range()) {
            let periods: Vec<_> = generate_periods(start, end).collect();

            for (idx, period) in periods.iter().enumerate() {
                prop_assert_eq!(period.period_no, i32::try_from(idx).unwrap() + 1);
            }
        }
    }
}
