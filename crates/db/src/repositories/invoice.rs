//! Invoice repository.
//!
//! Creation numbers the invoice from its own date and persists header plus
//! lines in one transaction. Caller-supplied amounts are trusted; nothing is
//! recomputed from quantity and rate.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_core::numbering::DocumentPrefix;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{
    customers, invoice_details, invoice_headers, products, sea_orm_active_enums::SupplyScope,
    vw_invoices,
};
use crate::repositories::numbering::next_document_number;
use crate::repositories::{is_foreign_key_violation, is_unique_violation};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("invoice not found: {0}")]
    NotFound(i64),

    /// Referenced customer does not exist for the company.
    #[error("customer not found: {0}")]
    CustomerNotFound(i64),

    /// Generated invoice number collided with an existing one.
    #[error("invoice number already exists: {0}")]
    DuplicateNumber(String),

    /// Search date value could not be parsed.
    #[error("invalid date: {0} (use dd/mm/yyyy or yyyy-mm-dd)")]
    InvalidDate(String),

    /// Deletion blocked by dependent records (receipt allocations).
    #[error("invoice is referenced by receipt allocations")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::NotFound(_) => Self::NotFound(err.to_string()),
            InvoiceError::CustomerNotFound(_) | InvoiceError::InvalidDate(_) => {
                Self::Validation(err.to_string())
            }
            InvoiceError::DuplicateNumber(_) => Self::Conflict(err.to_string()),
            InvoiceError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            InvoiceError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Header fields supplied by the caller; number and received amount are
/// system-maintained.
#[derive(Debug, Clone)]
pub struct InvoiceHeaderInput {
    /// Owning company.
    pub company_id: i64,
    /// Billed customer.
    pub customer_id: i64,
    /// Invoice date; also seeds the financial-year label of the number.
    pub invoice_date: NaiveDate,
    /// Customer reference number.
    pub reference_no: Option<String>,
    /// Customer reference date.
    pub reference_date: Option<NaiveDate>,
    /// Invoice currency.
    pub currency_id: i64,
    /// Exchange rate to the company base currency.
    pub exchange_rate: Decimal,
    /// Inter-state or intra-state supply.
    pub supply_type: SupplyScope,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Sum of line amounts before tax.
    pub gross_amount: Decimal,
    /// CGST total.
    pub cgst_amount: Decimal,
    /// SGST total.
    pub sgst_amount: Decimal,
    /// IGST total.
    pub igst_amount: Decimal,
    /// Discount total.
    pub discount_amount: Decimal,
    /// Other charges added.
    pub other_charges_added: Decimal,
    /// Other charges deducted.
    pub other_charges_deducted: Decimal,
    /// Rounding adjustment.
    pub rounded_off: Decimal,
    /// Payable total.
    pub net_amount: Decimal,
}

/// A single invoice line. `id` is ignored on create; on update it selects
/// the stored line to overwrite (unknown or missing ids insert a new line).
#[derive(Debug, Clone)]
pub struct InvoiceLineInput {
    /// Stored line id, when updating an existing line.
    pub id: Option<i64>,
    /// Position on the document.
    pub row_no: i32,
    /// Billed product.
    pub product_id: i64,
    /// Unit of measure.
    pub uom_id: i64,
    /// Quantity billed.
    pub quantity: Decimal,
    /// Unit rate.
    pub rate: Decimal,
    /// Line amount before tax.
    pub amount: Decimal,
    /// Discount kind ("percent"/"amount"), free-form.
    pub discount_type: Option<String>,
    /// Discount value.
    pub discount_value: Decimal,
    /// Tax applied to the line.
    pub tax_header_id: Option<i64>,
    /// Flat tax rate.
    pub tax_rate: Decimal,
    /// CGST rate component.
    pub cgst_rate: Decimal,
    /// SGST rate component.
    pub sgst_rate: Decimal,
    /// IGST rate component.
    pub igst_rate: Decimal,
    /// CGST amount.
    pub cgst_amount: Decimal,
    /// SGST amount.
    pub sgst_amount: Decimal,
    /// IGST amount.
    pub igst_amount: Decimal,
    /// Total tax on the line.
    pub tax_amount: Decimal,
    /// Line total including tax.
    pub net_amount: Decimal,
}

/// Fields to search invoices by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSearchField {
    /// Customer display name, substring match.
    CustomerName,
    /// Invoice number, substring match.
    InvoiceNo,
    /// Exact invoice date.
    InvoiceDate,
    /// Product name on any line, substring match.
    ProductName,
}

/// An invoice header with its lines.
#[derive(Debug, Clone)]
pub struct InvoiceWithLines {
    /// The header record.
    pub header: invoice_headers::Model,
    /// The lines, in row order.
    pub lines: Vec<invoice_details::Model>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice with a generated number, atomically with its lines.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` when the customer reference is dangling,
    /// `DuplicateNumber` when the generated number collides (concurrent
    /// create race), or a database error. Any failure rolls back the whole
    /// operation.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        header: InvoiceHeaderInput,
        lines: Vec<InvoiceLineInput>,
    ) -> Result<InvoiceWithLines, InvoiceError> {
        self.check_customer(header.company_id, header.customer_id)
            .await?;

        let txn = self.db.begin().await?;

        let invoice_no = next_document_number(
            &txn,
            header.company_id,
            DocumentPrefix::Invoice,
            header.invoice_date,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let model = invoice_headers::ActiveModel {
            id: NotSet,
            company_id: Set(header.company_id),
            customer_id: Set(header.customer_id),
            invoice_no: Set(invoice_no.clone()),
            invoice_date: Set(header.invoice_date),
            reference_no: Set(header.reference_no),
            reference_date: Set(header.reference_date),
            currency_id: Set(header.currency_id),
            exchange_rate: Set(header.exchange_rate),
            supply_type: Set(header.supply_type),
            remarks: Set(header.remarks),
            gross_amount: Set(header.gross_amount),
            cgst_amount: Set(header.cgst_amount),
            sgst_amount: Set(header.sgst_amount),
            igst_amount: Set(header.igst_amount),
            discount_amount: Set(header.discount_amount),
            other_charges_added: Set(header.other_charges_added),
            other_charges_deducted: Set(header.other_charges_deducted),
            rounded_off: Set(header.rounded_off),
            net_amount: Set(header.net_amount),
            received_amount: Set(Decimal::ZERO),
            is_cancelled: Set(false),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let inserted = match model.insert(&txn).await {
            Ok(h) => h,
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await?;
                return Err(InvoiceError::DuplicateNumber(invoice_no));
            }
            Err(e) => return Err(e.into()),
        };

        let mut stored_lines = Vec::with_capacity(lines.len());
        for line in lines {
            stored_lines.push(insert_line(&txn, inserted.id, &line).await?);
        }

        txn.commit().await?;

        info!(
            invoice_id = inserted.id,
            invoice_no = %inserted.invoice_no,
            company_id = inserted.company_id,
            lines = stored_lines.len(),
            "Invoice created"
        );

        Ok(InvoiceWithLines {
            header: inserted,
            lines: stored_lines,
        })
    }

    /// Updates an invoice header and optionally diff-syncs its lines.
    ///
    /// Header fields are overwritten wholesale. When `lines` is `None` the
    /// stored lines are left untouched; when present they are synced: known
    /// ids updated in place, unknown or missing ids inserted, stored lines
    /// absent from the payload deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist, or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        header: InvoiceHeaderInput,
        lines: Option<Vec<InvoiceLineInput>>,
    ) -> Result<InvoiceWithLines, InvoiceError> {
        let existing = invoice_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        self.check_customer(header.company_id, header.customer_id)
            .await?;

        let txn = self.db.begin().await?;

        let mut active: invoice_headers::ActiveModel = existing.into();
        active.company_id = Set(header.company_id);
        active.customer_id = Set(header.customer_id);
        active.invoice_date = Set(header.invoice_date);
        active.reference_no = Set(header.reference_no);
        active.reference_date = Set(header.reference_date);
        active.currency_id = Set(header.currency_id);
        active.exchange_rate = Set(header.exchange_rate);
        active.supply_type = Set(header.supply_type);
        active.remarks = Set(header.remarks);
        active.gross_amount = Set(header.gross_amount);
        active.cgst_amount = Set(header.cgst_amount);
        active.sgst_amount = Set(header.sgst_amount);
        active.igst_amount = Set(header.igst_amount);
        active.discount_amount = Set(header.discount_amount);
        active.other_charges_added = Set(header.other_charges_added);
        active.other_charges_deducted = Set(header.other_charges_deducted);
        active.rounded_off = Set(header.rounded_off);
        active.net_amount = Set(header.net_amount);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;

        if let Some(lines) = lines {
            sync_lines(&txn, id, lines).await?;
        }

        txn.commit().await?;

        info!(invoice_id = id, "Invoice updated");

        let lines = self.lines_for(id).await?;
        Ok(InvoiceWithLines {
            header: updated,
            lines,
        })
    }

    /// Deletes an invoice and its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when receipt allocations still
    /// reference the invoice, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), InvoiceError> {
        invoice_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let txn = self.db.begin().await?;

        invoice_details::Entity::delete_many()
            .filter(invoice_details::Column::InvoiceHeaderId.eq(id))
            .exec(&txn)
            .await?;

        match invoice_headers::Entity::delete_by_id(id).exec(&txn).await {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                txn.rollback().await?;
                return Err(InvoiceError::InUse);
            }
            Err(e) => return Err(e.into()),
        }

        txn.commit().await?;

        info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }

    /// Finds an invoice with its lines by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<InvoiceWithLines>, InvoiceError> {
        let Some(header) = invoice_headers::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let lines = self.lines_for(header.id).await?;
        Ok(Some(InvoiceWithLines { header, lines }))
    }

    /// Finds the denormalized view row for an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_view_by_id(
        &self,
        id: i64,
    ) -> Result<Option<vw_invoices::Model>, InvoiceError> {
        Ok(vw_invoices::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists invoices for a company from the reporting view, ordered by
    /// invoice number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<vw_invoices::Model>), InvoiceError> {
        let filter =
            vw_invoices::Entity::find().filter(vw_invoices::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let rows = filter
            .order_by_asc(vw_invoices::Column::InvoiceNo)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }

    /// Searches invoices of a company by one field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` for an unparseable date value, or a database
    /// error.
    pub async fn search(
        &self,
        company_id: i64,
        field: InvoiceSearchField,
        value: &str,
    ) -> Result<Vec<vw_invoices::Model>, InvoiceError> {
        let base =
            vw_invoices::Entity::find().filter(vw_invoices::Column::CompanyId.eq(company_id));

        let rows = match field {
            InvoiceSearchField::CustomerName => {
                base.filter(vw_invoices::Column::CustomerName.contains(value))
                    .order_by_asc(vw_invoices::Column::InvoiceNo)
                    .all(&self.db)
                    .await?
            }
            InvoiceSearchField::InvoiceNo => {
                base.filter(vw_invoices::Column::InvoiceNo.contains(value))
                    .order_by_asc(vw_invoices::Column::InvoiceNo)
                    .all(&self.db)
                    .await?
            }
            InvoiceSearchField::InvoiceDate => {
                let date = parse_search_date(value)
                    .ok_or_else(|| InvoiceError::InvalidDate(value.to_string()))?;
                base.filter(vw_invoices::Column::InvoiceDate.eq(date))
                    .order_by_asc(vw_invoices::Column::InvoiceNo)
                    .all(&self.db)
                    .await?
            }
            InvoiceSearchField::ProductName => {
                let header_ids = self.header_ids_with_product(value).await?;
                base.filter(vw_invoices::Column::Id.is_in(header_ids))
                    .order_by_asc(vw_invoices::Column::InvoiceNo)
                    .all(&self.db)
                    .await?
            }
        };

        Ok(rows)
    }

    /// Resolves header ids that carry a line whose product name matches.
    async fn header_ids_with_product(&self, value: &str) -> Result<Vec<i64>, DbErr> {
        let product_ids: Vec<i64> = products::Entity::find()
            .filter(products::Column::Name.contains(value))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let ids: HashSet<i64> = invoice_details::Entity::find()
            .filter(invoice_details::Column::ProductId.is_in(product_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|d| d.invoice_header_id)
            .collect();

        Ok(ids.into_iter().collect())
    }

    async fn check_customer(&self, company_id: i64, customer_id: i64) -> Result<(), InvoiceError> {
        let found = customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;

        if found.is_none() {
            return Err(InvoiceError::CustomerNotFound(customer_id));
        }
        Ok(())
    }

    async fn lines_for(&self, header_id: i64) -> Result<Vec<invoice_details::Model>, DbErr> {
        invoice_details::Entity::find()
            .filter(invoice_details::Column::InvoiceHeaderId.eq(header_id))
            .order_by_asc(invoice_details::Column::RowNo)
            .order_by_asc(invoice_details::Column::Id)
            .all(&self.db)
            .await
    }
}

/// Diff-syncs stored lines against the payload: known ids update in place,
/// unknown or missing ids insert, stored lines absent from the payload are
/// deleted.
async fn sync_lines(
    txn: &DatabaseTransaction,
    header_id: i64,
    lines: Vec<InvoiceLineInput>,
) -> Result<(), DbErr> {
    let existing_ids: HashSet<i64> = invoice_details::Entity::find()
        .filter(invoice_details::Column::InvoiceHeaderId.eq(header_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();

    let mut kept_ids = HashSet::new();

    for line in lines {
        match line.id {
            Some(line_id) if existing_ids.contains(&line_id) => {
                kept_ids.insert(line_id);
                let mut active = line_active_model(header_id, &line);
                active.id = Set(line_id);
                active.update(txn).await?;
            }
            // Stale or absent id: insert as a new line.
            _ => {
                insert_line(txn, header_id, &line).await?;
            }
        }
    }

    let to_delete: Vec<i64> = existing_ids.difference(&kept_ids).copied().collect();
    if !to_delete.is_empty() {
        invoice_details::Entity::delete_many()
            .filter(invoice_details::Column::Id.is_in(to_delete))
            .exec(txn)
            .await?;
    }

    Ok(())
}

async fn insert_line(
    txn: &DatabaseTransaction,
    header_id: i64,
    line: &InvoiceLineInput,
) -> Result<invoice_details::Model, DbErr> {
    line_active_model(header_id, line).insert(txn).await
}

fn line_active_model(header_id: i64, line: &InvoiceLineInput) -> invoice_details::ActiveModel {
    invoice_details::ActiveModel {
        id: NotSet,
        invoice_header_id: Set(header_id),
        row_no: Set(line.row_no),
        product_id: Set(line.product_id),
        uom_id: Set(line.uom_id),
        quantity: Set(line.quantity),
        rate: Set(line.rate),
        amount: Set(line.amount),
        discount_type: Set(line.discount_type.clone()),
        discount_value: Set(line.discount_value),
        tax_header_id: Set(line.tax_header_id),
        tax_rate: Set(line.tax_rate),
        cgst_rate: Set(line.cgst_rate),
        sgst_rate: Set(line.sgst_rate),
        igst_rate: Set(line.igst_rate),
        cgst_amount: Set(line.cgst_amount),
        sgst_amount: Set(line.sgst_amount),
        igst_amount: Set(line.igst_amount),
        tax_amount: Set(line.tax_amount),
        net_amount: Set(line.net_amount),
    }
}

/// Parses a user-facing search date in `dd/mm/yyyy` or `yyyy-mm-dd` form.
fn parse_search_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        assert_eq!(parse_search_date("15/07/2025"), Some(expected));
        assert_eq!(parse_search_date("2025-07-15"), Some(expected));
        assert_eq!(parse_search_date("07-15-2025"), None);
        assert_eq!(parse_search_date("yesterday"), None);
    }

    #[test]
    fn test_error_taxonomy_mapping() {
        assert!(matches!(
            AppError::from(InvoiceError::NotFound(9)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(InvoiceError::CustomerNotFound(3)),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(InvoiceError::DuplicateNumber("INV/2025-26-0001".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(InvoiceError::InUse),
            AppError::ReferentialConflict(_)
        ));
    }
}
