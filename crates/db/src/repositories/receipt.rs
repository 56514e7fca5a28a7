//! Receipt and allocation repository.
//!
//! A receipt allocates money against one or more invoices. Every mutation
//! that touches allocations recomputes the received amount of each affected
//! invoice inside the same transaction, so an invoice's balance always
//! equals the sum of its non-cancelled allocations.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, Statement, TransactionTrait,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_core::numbering::DocumentPrefix;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{
    customers, invoice_headers, receipt_details, receipt_headers, vw_receipts,
};
use crate::repositories::numbering::next_document_number;
use crate::repositories::is_unique_violation;

const RECOMPUTE_RECEIVED_SQL: &str = r"
UPDATE invoice_headers
SET received_amount = (
    SELECT COALESCE(SUM(rd.allocated_amount), 0)
    FROM receipt_details rd
    JOIN receipt_headers rh ON rh.id = rd.receipt_header_id
    WHERE rd.invoice_header_id = invoice_headers.id
      AND rh.is_cancelled = false
)
WHERE id = $1
";

/// Error types for receipt operations.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// Receipt not found.
    #[error("receipt not found: {0}")]
    NotFound(i64),

    /// Referenced customer does not exist for the company.
    #[error("customer not found: {0}")]
    CustomerNotFound(i64),

    /// An allocation references an invoice that does not exist.
    #[error("allocated invoice not found: {0}")]
    InvoiceNotFound(i64),

    /// Generated receipt number collided with an existing one.
    #[error("receipt number already exists: {0}")]
    DuplicateNumber(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReceiptError> for AppError {
    fn from(err: ReceiptError) -> Self {
        match err {
            ReceiptError::NotFound(_) => Self::NotFound(err.to_string()),
            ReceiptError::CustomerNotFound(_) | ReceiptError::InvoiceNotFound(_) => {
                Self::Validation(err.to_string())
            }
            ReceiptError::DuplicateNumber(_) => Self::Conflict(err.to_string()),
            ReceiptError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Header fields supplied by the caller; the number is system-generated.
#[derive(Debug, Clone)]
pub struct ReceiptHeaderInput {
    /// Owning company.
    pub company_id: i64,
    /// Paying customer.
    pub customer_id: i64,
    /// Receipt date; also seeds the financial-year label of the number.
    pub receipt_date: NaiveDate,
    /// Receipt kind (e.g. "Against Invoice", "Advance").
    pub receipt_type: String,
    /// Payment mode (e.g. "Bank", "Cheque", "Cash").
    pub payment_mode: String,
    /// Receipt currency.
    pub currency_id: i64,
    /// Exchange rate to the company base currency.
    pub exchange_rate: Decimal,
    /// Amount received in the receipt currency.
    pub receipt_amount: Decimal,
    /// Total across allocations.
    pub total_receipt_amount: Decimal,
    /// Bank transaction reference.
    pub transaction_no: Option<String>,
    /// Bank transaction date.
    pub transaction_date: Option<NaiveDate>,
    /// Cheque number.
    pub cheque_no: Option<String>,
    /// Cheque date.
    pub cheque_date: Option<NaiveDate>,
    /// Free-form remarks.
    pub remarks: Option<String>,
}

/// A single allocation line against an invoice. `id` is ignored on create;
/// on update it selects the stored line to overwrite.
#[derive(Debug, Clone)]
pub struct AllocationInput {
    /// Stored line id, when updating an existing allocation.
    pub id: Option<i64>,
    /// Position on the document.
    pub row_no: i32,
    /// The invoice this allocation pays down.
    pub invoice_header_id: i64,
    /// Invoice date, denormalized onto the line.
    pub invoice_date: NaiveDate,
    /// Invoice total, denormalized onto the line.
    pub invoice_amount: Decimal,
    /// Allocation currency (the invoice's currency).
    pub currency_id: i64,
    /// Exchange rate for this allocation.
    pub exchange_rate: Decimal,
    /// Amount allocated against the invoice, in the invoice's currency.
    pub allocated_amount: Decimal,
    /// Commission deducted.
    pub commission_amount: Decimal,
    /// Tax deducted at source.
    pub tds_amount: Decimal,
    /// Net amount after deductions.
    pub net_amount: Decimal,
}

/// Fields to search receipts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptSearchField {
    /// Receipt number, substring match.
    ReceiptNo,
    /// Customer display name, substring match.
    CustomerName,
    /// Allocated invoice number, substring match.
    InvoiceNo,
}

/// A receipt header with its allocation lines.
#[derive(Debug, Clone)]
pub struct ReceiptWithAllocations {
    /// The header record.
    pub header: receipt_headers::Model,
    /// The allocation lines, in row order.
    pub allocations: Vec<receipt_details::Model>,
}

/// Receipt repository.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    db: DatabaseConnection,
}

impl ReceiptRepository {
    /// Creates a new receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a receipt with a generated number and recomputes the balance
    /// of every allocated invoice, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound`/`InvoiceNotFound` for dangling references,
    /// `DuplicateNumber` on a number collision, or a database error. Any
    /// failure rolls back the whole operation.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        header: ReceiptHeaderInput,
        allocations: Vec<AllocationInput>,
    ) -> Result<ReceiptWithAllocations, ReceiptError> {
        self.check_customer(header.company_id, header.customer_id)
            .await?;
        self.check_invoices(&allocations).await?;

        let txn = self.db.begin().await?;

        let receipt_no = next_document_number(
            &txn,
            header.company_id,
            DocumentPrefix::Receipt,
            header.receipt_date,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let model = receipt_headers::ActiveModel {
            id: NotSet,
            company_id: Set(header.company_id),
            customer_id: Set(header.customer_id),
            receipt_no: Set(receipt_no.clone()),
            receipt_date: Set(header.receipt_date),
            receipt_type: Set(header.receipt_type),
            payment_mode: Set(header.payment_mode),
            currency_id: Set(header.currency_id),
            exchange_rate: Set(header.exchange_rate),
            receipt_amount: Set(header.receipt_amount),
            total_receipt_amount: Set(header.total_receipt_amount),
            transaction_no: Set(header.transaction_no),
            transaction_date: Set(header.transaction_date),
            cheque_no: Set(header.cheque_no),
            cheque_date: Set(header.cheque_date),
            remarks: Set(header.remarks),
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
                return Err(ReceiptError::DuplicateNumber(receipt_no));
            }
            Err(e) => return Err(e.into()),
        };

        let mut stored = Vec::with_capacity(allocations.len());
        let mut affected: HashSet<i64> = HashSet::new();
        for allocation in allocations {
            affected.insert(allocation.invoice_header_id);
            stored.push(insert_allocation(&txn, inserted.id, &allocation).await?);
        }

        for invoice_id in &affected {
            recompute_invoice_received(&txn, *invoice_id).await?;
        }

        txn.commit().await?;

        info!(
            receipt_id = inserted.id,
            receipt_no = %inserted.receipt_no,
            company_id = inserted.company_id,
            allocations = stored.len(),
            invoices_recomputed = affected.len(),
            "Receipt created"
        );

        Ok(ReceiptWithAllocations {
            header: inserted,
            allocations: stored,
        })
    }

    /// Updates a receipt header and optionally diff-syncs its allocations.
    ///
    /// Header fields are overwritten wholesale. When `allocations` is
    /// `None` the stored lines are untouched; when present they are synced
    /// (update matching ids, insert unknown/new, delete absent). Every
    /// invoice referenced before or after the sync is recomputed, so an
    /// invoice dropped from the payload returns to its true balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the receipt does not exist, or a database
    /// error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        header: ReceiptHeaderInput,
        allocations: Option<Vec<AllocationInput>>,
    ) -> Result<ReceiptWithAllocations, ReceiptError> {
        let existing = receipt_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ReceiptError::NotFound(id))?;

        self.check_customer(header.company_id, header.customer_id)
            .await?;
        if let Some(allocations) = &allocations {
            self.check_invoices(allocations).await?;
        }

        let txn = self.db.begin().await?;

        let mut active: receipt_headers::ActiveModel = existing.into();
        active.company_id = Set(header.company_id);
        active.customer_id = Set(header.customer_id);
        active.receipt_date = Set(header.receipt_date);
        active.receipt_type = Set(header.receipt_type);
        active.payment_mode = Set(header.payment_mode);
        active.currency_id = Set(header.currency_id);
        active.exchange_rate = Set(header.exchange_rate);
        active.receipt_amount = Set(header.receipt_amount);
        active.total_receipt_amount = Set(header.total_receipt_amount);
        active.transaction_no = Set(header.transaction_no);
        active.transaction_date = Set(header.transaction_date);
        active.cheque_no = Set(header.cheque_no);
        active.cheque_date = Set(header.cheque_date);
        active.remarks = Set(header.remarks);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;

        // Invoices referenced before the sync still need their balance
        // refreshed when their allocation goes away.
        let mut affected: HashSet<i64> = receipt_details::Entity::find()
            .filter(receipt_details::Column::ReceiptHeaderId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| d.invoice_header_id)
            .collect();

        if let Some(allocations) = allocations {
            for allocation in &allocations {
                affected.insert(allocation.invoice_header_id);
            }
            sync_allocations(&txn, id, allocations).await?;
        } else {
            // Header-only update: allocations are untouched, balances are
            // unchanged, skip the recompute sweep.
            affected.clear();
        }

        for invoice_id in &affected {
            recompute_invoice_received(&txn, *invoice_id).await?;
        }

        txn.commit().await?;

        info!(
            receipt_id = id,
            invoices_recomputed = affected.len(),
            "Receipt updated"
        );

        let allocations = self.allocations_for(id).await?;
        Ok(ReceiptWithAllocations {
            header: updated,
            allocations,
        })
    }

    /// Cancels or reinstates a receipt, refreshing every allocated
    /// invoice's balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing or a database error.
    pub async fn set_cancelled(
        &self,
        ctx: &RequestContext,
        id: i64,
        cancelled: bool,
    ) -> Result<receipt_headers::Model, ReceiptError> {
        let existing = receipt_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ReceiptError::NotFound(id))?;

        let txn = self.db.begin().await?;

        let mut active: receipt_headers::ActiveModel = existing.into();
        active.is_cancelled = Set(cancelled);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;

        let affected: HashSet<i64> = receipt_details::Entity::find()
            .filter(receipt_details::Column::ReceiptHeaderId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| d.invoice_header_id)
            .collect();

        for invoice_id in &affected {
            recompute_invoice_received(&txn, *invoice_id).await?;
        }

        txn.commit().await?;

        info!(receipt_id = id, cancelled, "Receipt cancel flag changed");
        Ok(updated)
    }

    /// Deletes a receipt and its allocations, then restores the balance of
    /// every invoice it touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), ReceiptError> {
        receipt_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ReceiptError::NotFound(id))?;

        let txn = self.db.begin().await?;

        let affected: HashSet<i64> = receipt_details::Entity::find()
            .filter(receipt_details::Column::ReceiptHeaderId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| d.invoice_header_id)
            .collect();

        receipt_details::Entity::delete_many()
            .filter(receipt_details::Column::ReceiptHeaderId.eq(id))
            .exec(&txn)
            .await?;

        receipt_headers::Entity::delete_by_id(id).exec(&txn).await?;

        for invoice_id in &affected {
            recompute_invoice_received(&txn, *invoice_id).await?;
        }

        txn.commit().await?;

        info!(
            receipt_id = id,
            invoices_recomputed = affected.len(),
            "Receipt deleted"
        );
        Ok(())
    }

    /// Finds a receipt with its allocations by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<ReceiptWithAllocations>, ReceiptError> {
        let Some(header) = receipt_headers::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let allocations = self.allocations_for(header.id).await?;
        Ok(Some(ReceiptWithAllocations {
            header,
            allocations,
        }))
    }

    /// Finds the denormalized view row for a receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_view_by_id(
        &self,
        id: i64,
    ) -> Result<Option<vw_receipts::Model>, ReceiptError> {
        Ok(vw_receipts::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists receipts for a company from the reporting view.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<vw_receipts::Model>), ReceiptError> {
        let filter =
            vw_receipts::Entity::find().filter(vw_receipts::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let rows = filter
            .order_by_asc(vw_receipts::Column::ReceiptNo)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }

    /// Searches receipts of a company by one field.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        company_id: i64,
        field: ReceiptSearchField,
        value: &str,
    ) -> Result<Vec<vw_receipts::Model>, ReceiptError> {
        let base =
            vw_receipts::Entity::find().filter(vw_receipts::Column::CompanyId.eq(company_id));

        let rows = match field {
            ReceiptSearchField::ReceiptNo => {
                base.filter(vw_receipts::Column::ReceiptNo.contains(value))
                    .order_by_asc(vw_receipts::Column::ReceiptNo)
                    .all(&self.db)
                    .await?
            }
            ReceiptSearchField::CustomerName => {
                base.filter(vw_receipts::Column::CustomerName.contains(value))
                    .order_by_asc(vw_receipts::Column::ReceiptNo)
                    .all(&self.db)
                    .await?
            }
            ReceiptSearchField::InvoiceNo => {
                let receipt_ids = self.receipt_ids_with_invoice(value).await?;
                base.filter(vw_receipts::Column::Id.is_in(receipt_ids))
                    .order_by_asc(vw_receipts::Column::ReceiptNo)
                    .all(&self.db)
                    .await?
            }
        };

        Ok(rows)
    }

    /// Resolves receipt ids holding an allocation against a matching
    /// invoice number.
    async fn receipt_ids_with_invoice(&self, value: &str) -> Result<Vec<i64>, DbErr> {
        let invoice_ids: Vec<i64> = invoice_headers::Entity::find()
            .filter(invoice_headers::Column::InvoiceNo.contains(value))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|h| h.id)
            .collect();

        let ids: HashSet<i64> = receipt_details::Entity::find()
            .filter(receipt_details::Column::InvoiceHeaderId.is_in(invoice_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|d| d.receipt_header_id)
            .collect();

        Ok(ids.into_iter().collect())
    }

    async fn check_customer(&self, company_id: i64, customer_id: i64) -> Result<(), ReceiptError> {
        let found = customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;

        if found.is_none() {
            return Err(ReceiptError::CustomerNotFound(customer_id));
        }
        Ok(())
    }

    async fn check_invoices(&self, allocations: &[AllocationInput]) -> Result<(), ReceiptError> {
        let wanted: HashSet<i64> = allocations.iter().map(|a| a.invoice_header_id).collect();

        for invoice_id in wanted {
            let found = invoice_headers::Entity::find_by_id(invoice_id)
                .one(&self.db)
                .await?;
            if found.is_none() {
                return Err(ReceiptError::InvoiceNotFound(invoice_id));
            }
        }
        Ok(())
    }

    async fn allocations_for(&self, header_id: i64) -> Result<Vec<receipt_details::Model>, DbErr> {
        receipt_details::Entity::find()
            .filter(receipt_details::Column::ReceiptHeaderId.eq(header_id))
            .order_by_asc(receipt_details::Column::RowNo)
            .order_by_asc(receipt_details::Column::Id)
            .all(&self.db)
            .await
    }
}

/// Rewrites an invoice's received amount as the sum of its non-cancelled
/// allocations. This is the single source of truth for how much has been
/// collected against an invoice; it runs after every allocation-affecting
/// mutation, including deletes.
pub async fn recompute_invoice_received<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i64,
) -> Result<(), DbErr> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        RECOMPUTE_RECEIVED_SQL,
        [invoice_id.into()],
    );
    conn.execute(stmt).await?;
    Ok(())
}

/// Diff-syncs stored allocations against the payload.
async fn sync_allocations(
    txn: &DatabaseTransaction,
    header_id: i64,
    allocations: Vec<AllocationInput>,
) -> Result<(), DbErr> {
    let existing_ids: HashSet<i64> = receipt_details::Entity::find()
        .filter(receipt_details::Column::ReceiptHeaderId.eq(header_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();

    let mut kept_ids = HashSet::new();

    for allocation in allocations {
        match allocation.id {
            Some(line_id) if existing_ids.contains(&line_id) => {
                kept_ids.insert(line_id);
                let mut active = allocation_active_model(header_id, &allocation);
                active.id = Set(line_id);
                active.update(txn).await?;
            }
            // Stale or absent id: insert as a new allocation.
            _ => {
                insert_allocation(txn, header_id, &allocation).await?;
            }
        }
    }

    let to_delete: Vec<i64> = existing_ids.difference(&kept_ids).copied().collect();
    if !to_delete.is_empty() {
        receipt_details::Entity::delete_many()
            .filter(receipt_details::Column::Id.is_in(to_delete))
            .exec(txn)
            .await?;
    }

    Ok(())
}

async fn insert_allocation(
    txn: &DatabaseTransaction,
    header_id: i64,
    allocation: &AllocationInput,
) -> Result<receipt_details::Model, DbErr> {
    allocation_active_model(header_id, allocation).insert(txn).await
}

fn allocation_active_model(
    header_id: i64,
    allocation: &AllocationInput,
) -> receipt_details::ActiveModel {
    receipt_details::ActiveModel {
        id: NotSet,
        receipt_header_id: Set(header_id),
        row_no: Set(allocation.row_no),
        invoice_header_id: Set(allocation.invoice_header_id),
        invoice_date: Set(allocation.invoice_date),
        invoice_amount: Set(allocation.invoice_amount),
        currency_id: Set(allocation.currency_id),
        exchange_rate: Set(allocation.exchange_rate),
        allocated_amount: Set(allocation.allocated_amount),
        commission_amount: Set(allocation.commission_amount),
        tds_amount: Set(allocation.tds_amount),
        net_amount: Set(allocation.net_amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy_mapping() {
        assert!(matches!(
            AppError::from(ReceiptError::NotFound(1)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(ReceiptError::InvoiceNotFound(5)),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(ReceiptError::DuplicateNumber("REC/2025-26-0001".into())),
            AppError::Conflict(_)
        ));
    }
}
