//! Invoice routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::entities::{invoice_details, invoice_headers, sea_orm_active_enums::SupplyScope};
use probill_db::repositories::invoice::{
    InvoiceHeaderInput, InvoiceLineInput, InvoiceRepository, InvoiceSearchField,
    InvoiceWithLines,
};
use probill_shared::types::{ListQuery, ListResponse};

/// One invoice line in a request payload.
#[derive(Debug, Deserialize)]
pub struct InvoiceLineRequest {
    /// Stored line id; used by updates to overwrite an existing line.
    pub id: Option<i64>,
    /// Position on the document.
    #[serde(default = "default_row_no")]
    pub row_no: i32,
    /// Billed product.
    pub product_id: i64,
    /// Unit of measure.
    pub uom_id: i64,
    /// Quantity billed.
    #[serde(default)]
    pub quantity: Decimal,
    /// Unit rate.
    #[serde(default)]
    pub rate: Decimal,
    /// Line amount before tax.
    #[serde(default)]
    pub amount: Decimal,
    /// Discount kind ("percent"/"amount").
    pub discount_type: Option<String>,
    /// Discount value.
    #[serde(default)]
    pub discount_value: Decimal,
    /// Tax applied to the line.
    pub tax_header_id: Option<i64>,
    /// Flat tax rate.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// CGST rate component.
    #[serde(default)]
    pub cgst_rate: Decimal,
    /// SGST rate component.
    #[serde(default)]
    pub sgst_rate: Decimal,
    /// IGST rate component.
    #[serde(default)]
    pub igst_rate: Decimal,
    /// CGST amount.
    #[serde(default)]
    pub cgst_amount: Decimal,
    /// SGST amount.
    #[serde(default)]
    pub sgst_amount: Decimal,
    /// IGST amount.
    #[serde(default)]
    pub igst_amount: Decimal,
    /// Total tax on the line.
    #[serde(default)]
    pub tax_amount: Decimal,
    /// Line total including tax.
    #[serde(default)]
    pub net_amount: Decimal,
}

fn default_row_no() -> i32 {
    1
}

fn default_one() -> Decimal {
    Decimal::ONE
}

impl From<InvoiceLineRequest> for InvoiceLineInput {
    fn from(line: InvoiceLineRequest) -> Self {
        Self {
            id: line.id,
            row_no: line.row_no,
            product_id: line.product_id,
            uom_id: line.uom_id,
            quantity: line.quantity,
            rate: line.rate,
            amount: line.amount,
            discount_type: line.discount_type,
            discount_value: line.discount_value,
            tax_header_id: line.tax_header_id,
            tax_rate: line.tax_rate,
            cgst_rate: line.cgst_rate,
            sgst_rate: line.sgst_rate,
            igst_rate: line.igst_rate,
            cgst_amount: line.cgst_amount,
            sgst_amount: line.sgst_amount,
            igst_amount: line.igst_amount,
            tax_amount: line.tax_amount,
            net_amount: line.net_amount,
        }
    }
}

/// Invoice header fields shared by create and update payloads. The invoice
/// number is never accepted from the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceHeaderRequest {
    /// Billed customer.
    pub customer_id: i64,
    /// Invoice date; seeds the financial-year label of the number.
    pub invoice_date: NaiveDate,
    /// Customer reference number.
    pub reference_no: Option<String>,
    /// Customer reference date.
    pub reference_date: Option<NaiveDate>,
    /// Invoice currency.
    pub currency_id: i64,
    /// Exchange rate to the company base currency.
    #[serde(default = "default_one")]
    pub exchange_rate: Decimal,
    /// Inter-state or intra-state supply.
    pub supply_type: SupplyScope,
    /// Free-form remarks.
    pub remarks: Option<String>,
    /// Sum of line amounts before tax.
    #[serde(default)]
    pub gross_amount: Decimal,
    /// CGST total.
    #[serde(default)]
    pub cgst_amount: Decimal,
    /// SGST total.
    #[serde(default)]
    pub sgst_amount: Decimal,
    /// IGST total.
    #[serde(default)]
    pub igst_amount: Decimal,
    /// Discount total.
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Other charges added.
    #[serde(default)]
    pub other_charges_added: Decimal,
    /// Other charges deducted.
    #[serde(default)]
    pub other_charges_deducted: Decimal,
    /// Rounding adjustment.
    #[serde(default)]
    pub rounded_off: Decimal,
    /// Payable total.
    #[serde(default)]
    pub net_amount: Decimal,
}

impl InvoiceHeaderRequest {
    fn into_input(self, company_id: i64) -> InvoiceHeaderInput {
        InvoiceHeaderInput {
            company_id,
            customer_id: self.customer_id,
            invoice_date: self.invoice_date,
            reference_no: self.reference_no,
            reference_date: self.reference_date,
            currency_id: self.currency_id,
            exchange_rate: self.exchange_rate,
            supply_type: self.supply_type,
            remarks: self.remarks,
            gross_amount: self.gross_amount,
            cgst_amount: self.cgst_amount,
            sgst_amount: self.sgst_amount,
            igst_amount: self.igst_amount,
            discount_amount: self.discount_amount,
            other_charges_added: self.other_charges_added,
            other_charges_deducted: self.other_charges_deducted,
            rounded_off: self.rounded_off,
            net_amount: self.net_amount,
        }
    }
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    /// Header fields.
    #[serde(flatten)]
    #[validate(nested)]
    pub header: InvoiceHeaderRequest,
    /// The invoice lines.
    #[serde(default)]
    pub lines: Vec<InvoiceLineRequest>,
}

/// Request body for updating an invoice.
///
/// When `lines` is omitted the stored lines are left untouched; when
/// present they are diff-synced against the payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    /// Header fields, overwritten wholesale.
    #[serde(flatten)]
    #[validate(nested)]
    pub header: InvoiceHeaderRequest,
    /// The invoice lines, when line changes are intended.
    pub lines: Option<Vec<InvoiceLineRequest>>,
}

/// Query string for searches.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Field to search: customername, invoiceno, invoicedate, productname.
    pub field: String,
    /// Value to match.
    pub value: String,
}

/// Response for an invoice with its lines.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// The header record.
    pub header: invoice_headers::Model,
    /// The lines, in row order.
    pub lines: Vec<invoice_details::Model>,
}

impl From<InvoiceWithLines> for InvoiceResponse {
    fn from(invoice: InvoiceWithLines) -> Self {
        Self {
            header: invoice.header,
            lines: invoice.lines,
        }
    }
}

fn parse_search_field(field: &str) -> Result<InvoiceSearchField, ApiError> {
    match field {
        "customername" => Ok(InvoiceSearchField::CustomerName),
        "invoiceno" => Ok(InvoiceSearchField::InvoiceNo),
        "invoicedate" => Ok(InvoiceSearchField::InvoiceDate),
        "productname" => Ok(InvoiceSearchField::ProductName),
        other => Err(ApiError::validation(format!("invalid search field: {other}"))),
    }
}

/// POST `/companies/{company_id}/invoices` - Create an invoice with a
/// generated number.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let created = repo
        .create(
            &auth.context(),
            payload.header.into_input(company_id),
            payload.lines.into_iter().map(Into::into).collect(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(created))))
}

/// GET `/companies/{company_id}/invoices` - List invoices from the
/// reporting view.
async fn list_invoices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{company_id}/invoices/search` - Search invoices.
async fn search_invoices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let field = parse_search_field(&query.field)?;

    let repo = InvoiceRepository::new((*state.db).clone());
    Ok(Json(repo.search(company_id, field, &query.value).await?))
}

/// GET `/invoices/{id}` - Fetch one invoice with its lines.
async fn get_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("invoice {id}")))?;
    Ok(Json(InvoiceResponse::from(invoice)))
}

/// PUT `/companies/{company_id}/invoices/{id}` - Update an invoice.
async fn update_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = InvoiceRepository::new((*state.db).clone());
    let updated = repo
        .update(
            &auth.context(),
            id,
            payload.header.into_input(company_id),
            payload
                .lines
                .map(|lines| lines.into_iter().map(Into::into).collect()),
        )
        .await?;

    Ok(Json(InvoiceResponse::from(updated)))
}

/// DELETE `/invoices/{id}` - Delete an invoice and its lines.
async fn delete_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(Json(json!({ "detail": "Invoice deleted successfully" })))
}

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/invoices", post(create_invoice))
        .route("/companies/{company_id}/invoices", get(list_invoices))
        .route(
            "/companies/{company_id}/invoices/search",
            get(search_invoices),
        )
        .route("/companies/{company_id}/invoices/{id}", put(update_invoice))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}", delete(delete_invoice))
}
