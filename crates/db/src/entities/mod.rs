//! `SeaORM` entity definitions.
//!
//! One module per table; `sea_orm_active_enums` holds the Postgres enum
//! mappings and the `vw_*` modules map the denormalized reporting views
//! (read-only projections, never written through).

pub mod sea_orm_active_enums;

pub mod cities;
pub mod companies;
pub mod countries;
pub mod currencies;
pub mod customers;
pub mod document_sequences;
pub mod financial_periods;
pub mod financial_years;
pub mod hsn_codes;
pub mod invoice_details;
pub mod invoice_headers;
pub mod products;
pub mod receipt_details;
pub mod receipt_headers;
pub mod states;
pub mod tax_details;
pub mod tax_headers;
pub mod uoms;
pub mod users;
pub mod vw_invoices;
pub mod vw_receipts;
