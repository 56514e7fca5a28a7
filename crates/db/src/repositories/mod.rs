//! Repository abstractions for data access.
//!
//! Each repository owns the persistence logic and transactional boundaries
//! for one aggregate. Mutating operations take a
//! [`probill_core::context::RequestContext`] for audit columns.

pub mod company;
pub mod currency;
pub mod customer;
pub mod financial_year;
pub mod geography;
pub mod hsn;
pub mod invoice;
pub mod numbering;
pub mod product;
pub mod receipt;
pub mod tax;
pub mod uom;
pub mod user;

pub use company::CompanyRepository;
pub use currency::CurrencyRepository;
pub use customer::CustomerRepository;
pub use financial_year::FinancialYearRepository;
pub use geography::GeographyRepository;
pub use hsn::HsnRepository;
pub use invoice::InvoiceRepository;
pub use product::ProductRepository;
pub use receipt::ReceiptRepository;
pub use tax::TaxRepository;
pub use uom::UomRepository;
pub use user::UserRepository;

use sea_orm::DbErr;

/// Returns true when a database error is a foreign-key constraint violation.
///
/// Used to translate delete failures into user-facing referential-conflict
/// errors instead of raw constraint messages.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    err.to_string().to_lowercase().contains("foreign key")
}

/// Returns true when a database error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("duplicate key") || message.contains("unique constraint")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_violation_detection() {
        let err = DbErr::Custom(
            "update or delete on table violates foreign key constraint".to_string(),
        );
        assert!(is_foreign_key_violation(&err));
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn test_unique_violation_detection() {
        let err = DbErr::Custom(
            "duplicate key value violates unique constraint \"idx\"".to_string(),
        );
        assert!(is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
    }
}
