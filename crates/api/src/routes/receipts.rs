//! Receipt routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::entities::{receipt_details, receipt_headers};
use probill_db::repositories::receipt::{
    AllocationInput, ReceiptHeaderInput, ReceiptRepository, ReceiptSearchField,
    ReceiptWithAllocations,
};
use probill_shared::types::{ListQuery, ListResponse};

/// One allocation line in a request payload.
#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    /// Stored line id; used by updates to overwrite an existing line.
    pub id: Option<i64>,
    /// Position on the document.
    #[serde(default = "default_row_no")]
    pub row_no: i32,
    /// The invoice this allocation pays down.
    pub invoice_header_id: i64,
    /// Invoice date, denormalized onto the line.
    pub invoice_date: NaiveDate,
    /// Invoice total, denormalized onto the line.
    #[serde(default)]
    pub invoice_amount: Decimal,
    /// Allocation currency (the invoice's currency).
    pub currency_id: i64,
    /// Exchange rate for this allocation.
    #[serde(default = "default_one")]
    pub exchange_rate: Decimal,
    /// Amount allocated against the invoice.
    pub allocated_amount: Decimal,
    /// Commission deducted.
    #[serde(default)]
    pub commission_amount: Decimal,
    /// Tax deducted at source.
    #[serde(default)]
    pub tds_amount: Decimal,
    /// Net amount after deductions.
    #[serde(default)]
    pub net_amount: Decimal,
}

fn default_row_no() -> i32 {
    1
}

fn default_one() -> Decimal {
    Decimal::ONE
}

impl From<AllocationRequest> for AllocationInput {
    fn from(line: AllocationRequest) -> Self {
        Self {
            id: line.id,
            row_no: line.row_no,
            invoice_header_id: line.invoice_header_id,
            invoice_date: line.invoice_date,
            invoice_amount: line.invoice_amount,
            currency_id: line.currency_id,
            exchange_rate: line.exchange_rate,
            allocated_amount: line.allocated_amount,
            commission_amount: line.commission_amount,
            tds_amount: line.tds_amount,
            net_amount: line.net_amount,
        }
    }
}

/// Receipt header fields shared by create and update payloads. The receipt
/// number is never accepted from the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct ReceiptHeaderRequest {
    /// Paying customer.
    pub customer_id: i64,
    /// Receipt date; seeds the financial-year label of the number.
    pub receipt_date: NaiveDate,
    /// Receipt kind (e.g. "Against Invoice", "Advance").
    #[validate(length(min = 1, message = "receipt type is required"))]
    pub receipt_type: String,
    /// Payment mode (e.g. "Bank", "Cheque", "Cash").
    #[validate(length(min = 1, message = "payment mode is required"))]
    pub payment_mode: String,
    /// Receipt currency.
    pub currency_id: i64,
    /// Exchange rate to the company base currency.
    #[serde(default = "default_one")]
    pub exchange_rate: Decimal,
    /// Amount received in the receipt currency.
    #[serde(default)]
    pub receipt_amount: Decimal,
    /// Total across allocations.
    #[serde(default)]
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

impl ReceiptHeaderRequest {
    fn into_input(self, company_id: i64) -> ReceiptHeaderInput {
        ReceiptHeaderInput {
            company_id,
            customer_id: self.customer_id,
            receipt_date: self.receipt_date,
            receipt_type: self.receipt_type,
            payment_mode: self.payment_mode,
            currency_id: self.currency_id,
            exchange_rate: self.exchange_rate,
            receipt_amount: self.receipt_amount,
            total_receipt_amount: self.total_receipt_amount,
            transaction_no: self.transaction_no,
            transaction_date: self.transaction_date,
            cheque_no: self.cheque_no,
            cheque_date: self.cheque_date,
            remarks: self.remarks,
        }
    }
}

/// Request body for creating a receipt.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReceiptRequest {
    /// Header fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub header: ReceiptHeaderRequest,
    /// The allocation lines.
    #[serde(default)]
    pub allocations: Vec<AllocationRequest>,
}

/// Request body for updating a receipt.
///
/// When `allocations` is omitted the stored lines are left untouched; when
/// present they are diff-synced against the payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReceiptRequest {
    /// Header fields, overwritten wholesale.
    #[serde(flatten)]
    #[validate(nested)]
    pub header: ReceiptHeaderRequest,
    /// The allocation lines, when allocation changes are intended.
    pub allocations: Option<Vec<AllocationRequest>>,
}

/// Request body for cancelling or reinstating a receipt.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    /// True to cancel, false to reinstate.
    pub cancelled: bool,
}

/// Query string for searches.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Field to search: receiptno, customername, invoiceno.
    pub field: String,
    /// Value to match.
    pub value: String,
}

/// Response for a receipt with its allocations.
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    /// The header record.
    pub header: receipt_headers::Model,
    /// The allocation lines, in row order.
    pub allocations: Vec<receipt_details::Model>,
}

impl From<ReceiptWithAllocations> for ReceiptResponse {
    fn from(receipt: ReceiptWithAllocations) -> Self {
        Self {
            header: receipt.header,
            allocations: receipt.allocations,
        }
    }
}

fn parse_search_field(field: &str) -> Result<ReceiptSearchField, ApiError> {
    match field {
        "receiptno" => Ok(ReceiptSearchField::ReceiptNo),
        "customername" => Ok(ReceiptSearchField::CustomerName),
        "invoiceno" => Ok(ReceiptSearchField::InvoiceNo),
        other => Err(ApiError::validation(format!("invalid search field: {other}"))),
    }
}

/// POST `/companies/{company_id}/receipts` - Create a receipt with a
/// generated number; allocated invoices' balances update in the same
/// transaction.
async fn create_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<CreateReceiptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = ReceiptRepository::new((*state.db).clone());
    let created = repo
        .create(
            &auth.context(),
            payload.header.into_input(company_id),
            payload.allocations.into_iter().map(Into::into).collect(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReceiptResponse::from(created))))
}

/// GET `/companies/{company_id}/receipts` - List receipts from the
/// reporting view.
async fn list_receipts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ReceiptRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{company_id}/receipts/search` - Search receipts.
async fn search_receipts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let field = parse_search_field(&query.field)?;

    let repo = ReceiptRepository::new((*state.db).clone());
    Ok(Json(repo.search(company_id, field, &query.value).await?))
}

/// GET `/receipts/{id}` - Fetch one receipt with its allocations.
async fn get_receipt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ReceiptRepository::new((*state.db).clone());
    let receipt = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("receipt {id}")))?;
    Ok(Json(ReceiptResponse::from(receipt)))
}

/// PUT `/companies/{company_id}/receipts/{id}` - Update a receipt; every
/// invoice referenced before or after the change is recomputed.
async fn update_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateReceiptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = ReceiptRepository::new((*state.db).clone());
    let updated = repo
        .update(
            &auth.context(),
            id,
            payload.header.into_input(company_id),
            payload
                .allocations
                .map(|allocations| allocations.into_iter().map(Into::into).collect()),
        )
        .await?;

    Ok(Json(ReceiptResponse::from(updated)))
}

/// PATCH `/receipts/{id}/cancel` - Cancel or reinstate a receipt.
async fn cancel_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CancelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ReceiptRepository::new((*state.db).clone());
    let header = repo
        .set_cancelled(&auth.context(), id, payload.cancelled)
        .await?;
    Ok(Json(header))
}

/// DELETE `/receipts/{id}` - Delete a receipt; allocated invoices'
/// balances are restored.
async fn delete_receipt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ReceiptRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(Json(json!({ "detail": "Receipt deleted successfully" })))
}

/// Creates the receipt routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/receipts", post(create_receipt))
        .route("/companies/{company_id}/receipts", get(list_receipts))
        .route(
            "/companies/{company_id}/receipts/search",
            get(search_receipts),
        )
        .route("/companies/{company_id}/receipts/{id}", put(update_receipt))
        .route("/receipts/{id}", get(get_receipt))
        .route("/receipts/{id}/cancel", patch(cancel_receipt))
        .route("/receipts/{id}", delete(delete_receipt))
}
