//! Document numbering service.
//!
//! Numbers are scoped by (company, financial year, document prefix) and
//! advanced through a counter row in `document_sequences`. The upsert below
//! is a single atomic statement, so concurrent creators queue on the row
//! lock instead of reading the same latest number; the unique index on the
//! document number column is the backstop.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};

use probill_core::numbering::{DocumentPrefix, financial_year_label, format_document_number};

const ADVANCE_SEQUENCE_SQL: &str = r"
INSERT INTO document_sequences (company_id, prefix, financial_year, last_number)
VALUES ($1, $2, $3, 1)
ON CONFLICT (company_id, prefix, financial_year)
DO UPDATE SET last_number = document_sequences.last_number + 1
RETURNING last_number
";

/// Allocates the next document number for a company, seeded from the
/// document's own date.
///
/// Must be called inside the transaction that persists the document so a
/// rollback releases the counter row lock together with everything else.
/// Sequences only ever advance - cancelled or deleted documents leave gaps.
///
/// # Errors
///
/// Returns an error if the counter upsert fails.
pub async fn next_document_number<C: ConnectionTrait>(
    conn: &C,
    company_id: i64,
    prefix: DocumentPrefix,
    document_date: NaiveDate,
) -> Result<String, DbErr> {
    let label = financial_year_label(document_date);

    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        ADVANCE_SEQUENCE_SQL,
        [company_id.into(), prefix.as_str().into(), label.clone().into()],
    );

    let row = conn
        .query_one(stmt)
        .await?
        .ok_or_else(|| DbErr::Custom("sequence upsert returned no row".to_string()))?;

    let sequence: i64 = row.try_get("", "last_number")?;

    Ok(format_document_number(prefix, &label, sequence))
}
