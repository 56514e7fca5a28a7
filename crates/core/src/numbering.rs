//! Document number formatting and financial-year labels.
//!
//! Invoice and receipt numbers look like `INV/2025-26-0042`: a document
//! prefix, the April-to-March financial-year label derived from the
//! document's own date, and a zero-padded sequence scoped to
//! (company, financial year). The sequence itself is advanced by the db
//! layer; everything here is pure string work.

use chrono::{Datelike, NaiveDate};

/// Document types that receive generated numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPrefix {
    /// Sales invoice, prefix "INV".
    Invoice,
    /// Customer receipt, prefix "REC".
    Receipt,
}

impl DocumentPrefix {
    /// Returns the prefix string used in document numbers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Receipt => "REC",
        }
    }
}

impl std::fmt::Display for DocumentPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the `YYYY-YY` financial-year label for a date.
///
/// The financial year runs April to March: April 2025 through March 2026 is
/// "2025-26". January to March belong to the previous year's label.
#[must_use]
pub fn financial_year_label(date: NaiveDate) -> String {
    let year = date.year();
    let (start_year, end_year) = if date.month() < 4 {
        (year - 1, year)
    } else {
        (year, year + 1)
    };
    format!("{start_year}-{:02}", end_year.rem_euclid(100))
}

/// Formats a document number from its parts.
///
/// The sequence is zero-padded to four digits and widens naturally beyond
/// 9999.
#[must_use]
pub fn format_document_number(prefix: DocumentPrefix, fy_label: &str, sequence: i64) -> String {
    format!("{prefix}/{fy_label}-{sequence:04}")
}

/// Extracts the numeric sequence suffix after the last `-`.
///
/// Returns `None` when the number does not end in digits.
#[must_use]
pub fn parse_sequence(document_number: &str) -> Option<i64> {
    document_number
        .rsplit('-')
        .next()
        .and_then(|suffix| suffix.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_label_april_onwards() {
        assert_eq!(financial_year_label(date(2025, 4, 1)), "2025-26");
        assert_eq!(financial_year_label(date(2025, 12, 31)), "2025-26");
    }

    #[test]
    fn test_label_january_to_march() {
        assert_eq!(financial_year_label(date(2026, 1, 1)), "2025-26");
        assert_eq!(financial_year_label(date(2026, 3, 31)), "2025-26");
    }

    #[test]
    fn test_label_boundary_days() {
        // March 31 and April 1 sit in different financial years.
        assert_eq!(financial_year_label(date(2025, 3, 31)), "2024-25");
        assert_eq!(financial_year_label(date(2025, 4, 1)), "2025-26");
    }

    #[test]
    fn test_label_century_wrap() {
        assert_eq!(financial_year_label(date(2099, 6, 1)), "2099-00");
    }

    #[test]
    fn test_format_invoice_number() {
        assert_eq!(
            format_document_number(DocumentPrefix::Invoice, "2025-26", 1),
            "INV/2025-26-0001"
        );
        assert_eq!(
            format_document_number(DocumentPrefix::Receipt, "2025-26", 42),
            "REC/2025-26-0042"
        );
    }

    #[test]
    fn test_format_widens_past_four_digits() {
        assert_eq!(
            format_document_number(DocumentPrefix::Invoice, "2025-26", 12345),
            "INV/2025-26-12345"
        );
    }

    #[test]
    fn test_generated_numbers_match_documented_shape() {
        // ^(INV|REC)/\d{4}-\d{2}-\d{4}$
        let number = format_document_number(
            DocumentPrefix::Invoice,
            &financial_year_label(date(2025, 7, 15)),
            7,
        );
        let (prefix, rest) = number.split_once('/').unwrap();
        assert!(prefix == "INV" || prefix == "REC");

        let parts: Vec<&str> = rest.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 4);
        assert!(parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())));
    }

    #[test]
    fn test_parse_sequence_round_trip() {
        let number = format_document_number(DocumentPrefix::Invoice, "2025-26", 99);
        assert_eq!(parse_sequence(&number), Some(99));
    }

    #[test]
    fn test_parse_sequence_rejects_garbage() {
        assert_eq!(parse_sequence("INV/2025-26-"), None);
        assert_eq!(parse_sequence("not a number"), None);
    }
}
