//! Tax master routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::entities::{tax_details, tax_headers};
use probill_db::repositories::tax::{TaxInput, TaxRepository, TaxWithDetails};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating or overwriting a tax.
#[derive(Debug, Deserialize, Validate)]
pub struct TaxRequest {
    /// Tax regime; only "GST" derives slab details.
    #[serde(default = "default_tax_type")]
    pub tax_type: String,
    /// Display name, unique per company.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Flat percentage rate.
    #[serde(default)]
    pub rate: Decimal,
    /// Active flag; defaults to true.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_tax_type() -> String {
    "GST".to_string()
}

fn default_true() -> bool {
    true
}

/// Response for a tax with its derived slabs.
#[derive(Debug, Serialize)]
pub struct TaxResponse {
    /// The header record.
    pub header: tax_headers::Model,
    /// The derived slab rows, in row order.
    pub details: Vec<tax_details::Model>,
}

impl From<TaxWithDetails> for TaxResponse {
    fn from(tax: TaxWithDetails) -> Self {
        Self {
            header: tax.header,
            details: tax.details,
        }
    }
}

/// POST `/companies/{company_id}/taxes` - Create a tax.
async fn create_tax(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<TaxRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = TaxRepository::new((*state.db).clone());
    let tax = repo
        .create(
            &auth.context(),
            TaxInput {
                company_id,
                tax_type: payload.tax_type,
                name: payload.name,
                rate: payload.rate,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TaxResponse::from(tax))))
}

/// GET `/companies/{company_id}/taxes` - List tax headers.
async fn list_taxes(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TaxRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{company_id}/taxes/by-name/{name}` - Fetch by name.
async fn get_tax_by_name(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((company_id, name)): Path<(i64, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TaxRepository::new((*state.db).clone());
    let tax = repo
        .find_by_name(company_id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("tax \"{name}\"")))?;
    Ok(Json(TaxResponse::from(tax)))
}

/// GET `/taxes/{id}` - Fetch one tax with its slabs.
async fn get_tax(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TaxRepository::new((*state.db).clone());
    let tax = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("tax {id}")))?;
    Ok(Json(TaxResponse::from(tax)))
}

/// PUT `/companies/{company_id}/taxes/{id}` - Overwrite a tax; slabs are
/// always regenerated.
async fn update_tax(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<TaxRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = TaxRepository::new((*state.db).clone());
    let tax = repo
        .update(
            &auth.context(),
            id,
            TaxInput {
                company_id,
                tax_type: payload.tax_type,
                name: payload.name,
                rate: payload.rate,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(TaxResponse::from(tax)))
}

/// DELETE `/taxes/{id}` - Delete a tax and its slabs.
async fn delete_tax(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TaxRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(Json(json!({ "detail": "Tax deleted successfully" })))
}

/// Creates the tax routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/taxes", post(create_tax))
        .route("/companies/{company_id}/taxes", get(list_taxes))
        .route(
            "/companies/{company_id}/taxes/by-name/{name}",
            get(get_tax_by_name),
        )
        .route("/companies/{company_id}/taxes/{id}", put(update_tax))
        .route("/taxes/{id}", get(get_tax))
        .route("/taxes/{id}", delete(delete_tax))
}
