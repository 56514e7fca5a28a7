//! Financial year and period calculations.
//!
//! A financial year is a named, company-scoped date range that owns a set of
//! monthly periods tiling the range. Everything here is pure: the db crate
//! persists whatever these functions produce.

mod period;

pub use period::{GeneratedPeriod, PeriodStatus, Periods, generate_periods};

use chrono::NaiveDate;
use thiserror::Error;

/// Errors for financial calendar calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// Start date must be before end date.
    #[error("start date must be before end date")]
    InvalidDateRange,
}

/// Validates that `start` is strictly before `end`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), CalendarError> {
    if start >= end {
        return Err(CalendarError::InvalidDateRange);
    }
    Ok(())
}

/// Checks whether two inclusive date ranges overlap.
///
/// Ranges [a_start, a_end] and [b_start, b_end] overlap when
/// `a_start <= b_end && a_end >= b_start`.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_fiscal_year_apr_mar() {
        assert!(validate_date_range(date(2024, 4, 1), date(2025, 3, 31)).is_ok());
    }

    #[test]
    fn test_same_date_rejected() {
        assert_eq!(
            validate_date_range(date(2024, 4, 1), date(2024, 4, 1)),
            Err(CalendarError::InvalidDateRange)
        );
    }

    #[test]
    fn test_end_before_start_rejected() {
        assert_eq!(
            validate_date_range(date(2025, 3, 31), date(2024, 4, 1)),
            Err(CalendarError::InvalidDateRange)
        );
    }

    #[test]
    fn test_overlapping_years_detected() {
        // FY 2024-25 vs a range starting mid-year
        assert!(date_ranges_overlap(
            date(2024, 4, 1),
            date(2025, 3, 31),
            date(2024, 10, 1),
            date(2025, 1, 1),
        ));
    }

    #[test]
    fn test_adjacent_years_do_not_overlap() {
        assert!(!date_ranges_overlap(
            date(2024, 4, 1),
            date(2025, 3, 31),
            date(2025, 4, 1),
            date(2026, 3, 31),
        ));
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        // Inclusive ranges: sharing a single day counts as overlap.
        assert!(date_ranges_overlap(
            date(2024, 4, 1),
            date(2025, 3, 31),
            date(2025, 3, 31),
            date(2026, 3, 30),
        ));
    }
}
