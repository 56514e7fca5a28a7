//! GST slab derivation.
//!
//! A tax header carries a flat rate; the detail rows are derived, never
//! edited by hand. For GST the rate splits into an inter-state component
//! (IGST at the full rate) and two intra-state components (CGST and SGST at
//! half the rate each).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a slab applies to inter-state or intra-state supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyScope {
    /// Supply across state borders (IGST).
    Inter,
    /// Supply within a state (CGST/SGST).
    Intra,
}

impl SupplyScope {
    /// Returns the canonical string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inter => "Inter",
            Self::Intra => "Intra",
        }
    }
}

/// A derived tax slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    /// Row position within the header, starting at 1.
    pub row_no: i32,
    /// Supply scope of the slab.
    pub supply: SupplyScope,
    /// Slab display name, e.g. "IGST 18%".
    pub name: String,
    /// Slab rate as a percentage.
    pub rate: Decimal,
}

/// Derives the ordered slab breakdown for a tax type and rate.
///
/// For type "GST" (case-insensitive) this returns exactly three slabs in a
/// fixed order: IGST at the full rate, then CGST and SGST at half the rate
/// each. Any other type yields no slabs - no other regime is modeled.
#[must_use]
pub fn generate_tax_details(tax_type: &str, rate: Decimal) -> Vec<TaxSlab> {
    if !tax_type.eq_ignore_ascii_case("GST") {
        return Vec::new();
    }

    let half_rate = (rate / Decimal::TWO).normalize();
    let rate = rate.normalize();

    [
        (SupplyScope::Inter, format!("IGST {rate}%"), rate),
        (SupplyScope::Intra, format!("CGST {half_rate}%"), half_rate),
        (SupplyScope::Intra, format!("SGST {half_rate}%"), half_rate),
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, (supply, name, rate))| TaxSlab {
        row_no: i32::try_from(idx).unwrap_or(i32::MAX) + 1,
        supply,
        name,
        rate,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_gst_splits_into_three_slabs() {
        let slabs = generate_tax_details("GST", dec!(18));

        assert_eq!(slabs.len(), 3);

        assert_eq!(slabs[0].row_no, 1);
        assert_eq!(slabs[0].supply, SupplyScope::Inter);
        assert_eq!(slabs[0].name, "IGST 18%");
        assert_eq!(slabs[0].rate, dec!(18));

        assert_eq!(slabs[1].row_no, 2);
        assert_eq!(slabs[1].supply, SupplyScope::Intra);
        assert_eq!(slabs[1].name, "CGST 9%");
        assert_eq!(slabs[1].rate, dec!(9));

        assert_eq!(slabs[2].row_no, 3);
        assert_eq!(slabs[2].supply, SupplyScope::Intra);
        assert_eq!(slabs[2].name, "SGST 9%");
        assert_eq!(slabs[2].rate, dec!(9));
    }

    #[test]
    fn test_odd_rate_halves_exactly() {
        let slabs = generate_tax_details("GST", dec!(5));

        assert_eq!(slabs[1].rate, dec!(2.5));
        assert_eq!(slabs[2].rate, dec!(2.5));
        assert_eq!(slabs[1].name, "CGST 2.5%");
        // No decimal dust: CGST + SGST must reconstruct IGST.
        assert_eq!(slabs[1].rate + slabs[2].rate, slabs[0].rate);
    }

    #[test]
    fn test_gst_is_case_insensitive() {
        assert_eq!(generate_tax_details("gst", dec!(12)).len(), 3);
        assert_eq!(generate_tax_details("Gst", dec!(12)).len(), 3);
    }

    #[test]
    fn test_unknown_type_yields_no_slabs() {
        assert!(generate_tax_details("VAT", dec!(18)).is_empty());
        assert!(generate_tax_details("", dec!(18)).is_empty());
    }

    #[test]
    fn test_intra_components_sum_to_inter() {
        for rate in [dec!(0), dec!(0.25), dec!(3), dec!(5), dec!(12), dec!(18), dec!(28)] {
            let slabs = generate_tax_details("GST", rate);
            assert_eq!(slabs[1].rate + slabs[2].rate, slabs[0].rate, "rate {rate}");
            assert_eq!(slabs[0].rate, rate.normalize());
        }
    }
}
