//! Product management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::repositories::product::{ProductInput, ProductRepository};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating or overwriting a product.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    /// Short code, unique per company.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Free-form specification.
    pub specification: Option<String>,
    /// UOM used when selling.
    pub selling_uom_id: i64,
    /// UOM used when purchasing.
    pub purchase_uom_id: i64,
    /// Selling price.
    #[serde(default)]
    pub selling_price: Decimal,
    /// Cost price.
    #[serde(default)]
    pub cost_price: Decimal,
    /// HSN classification code.
    pub hsn_code: Option<String>,
    /// Default tax applied to the product.
    pub tax_header_id: i64,
    /// Denormalized tax rate.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Active flag; defaults to true.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Query string for searches.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match.
    pub value: String,
}

impl ProductRequest {
    fn into_input(self, company_id: i64) -> ProductInput {
        ProductInput {
            company_id,
            code: self.code,
            name: self.name,
            specification: self.specification,
            selling_uom_id: self.selling_uom_id,
            purchase_uom_id: self.purchase_uom_id,
            selling_price: self.selling_price,
            cost_price: self.cost_price,
            hsn_code: self.hsn_code,
            tax_header_id: self.tax_header_id,
            tax_rate: self.tax_rate,
            is_active: self.is_active,
        }
    }
}

/// POST `/companies/{company_id}/products` - Create a product.
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = ProductRepository::new((*state.db).clone());
    let product = repo
        .create(&auth.context(), payload.into_input(company_id))
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET `/companies/{company_id}/products` - List products.
async fn list_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{company_id}/products/search` - Search by name.
async fn search_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new((*state.db).clone());
    Ok(Json(repo.search_by_name(company_id, &query.value).await?))
}

/// GET `/products/{id}` - Fetch one product.
async fn get_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new((*state.db).clone());
    let product = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("product {id}")))?;
    Ok(Json(product))
}

/// PUT `/companies/{company_id}/products/{id}` - Overwrite a product.
async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = ProductRepository::new((*state.db).clone());
    let product = repo
        .update(&auth.context(), id, payload.into_input(company_id))
        .await?;

    Ok(Json(product))
}

/// DELETE `/products/{id}` - Delete a product.
async fn delete_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/products", post(create_product))
        .route("/companies/{company_id}/products", get(list_products))
        .route(
            "/companies/{company_id}/products/search",
            get(search_products),
        )
        .route("/companies/{company_id}/products/{id}", put(update_product))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}", delete(delete_product))
}
