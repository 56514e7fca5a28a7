//! Customer management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::repositories::customer::{CustomerInput, CustomerRepository};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating or overwriting a customer.
#[derive(Debug, Deserialize, Validate)]
pub struct CustomerRequest {
    /// Display name.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Short code, unique per company.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Billing address line 1.
    pub address1: Option<String>,
    /// Billing address line 2.
    pub address2: Option<String>,
    /// City reference.
    pub city_id: Option<i64>,
    /// State reference.
    pub state_id: Option<i64>,
    /// Country reference.
    pub country_id: Option<i64>,
    /// GST registration number.
    pub gst_no: Option<String>,
    /// Contact e-mail.
    #[validate(email)]
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Billing currency reference.
    pub currency_id: Option<i64>,
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

impl CustomerRequest {
    fn into_input(self, company_id: i64) -> CustomerInput {
        CustomerInput {
            company_id,
            name: self.name,
            code: self.code,
            address1: self.address1,
            address2: self.address2,
            city_id: self.city_id,
            state_id: self.state_id,
            country_id: self.country_id,
            gst_no: self.gst_no,
            email: self.email,
            phone: self.phone,
            currency_id: self.currency_id,
            is_active: self.is_active,
        }
    }
}

/// POST `/companies/{company_id}/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = CustomerRepository::new((*state.db).clone());
    let customer = repo
        .create(&auth.context(), payload.into_input(company_id))
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET `/companies/{company_id}/customers` - List customers.
async fn list_customers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{company_id}/customers/search` - Search by name.
async fn search_customers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());
    Ok(Json(repo.search_by_name(company_id, &query.value).await?))
}

/// GET `/customers/{id}` - Fetch one customer.
async fn get_customer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());
    let customer = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("customer {id}")))?;
    Ok(Json(customer))
}

/// PUT `/companies/{company_id}/customers/{id}` - Overwrite a customer.
async fn update_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = CustomerRepository::new((*state.db).clone());
    let customer = repo
        .update(&auth.context(), id, payload.into_input(company_id))
        .await?;

    Ok(Json(customer))
}

/// DELETE `/customers/{id}` - Delete a customer.
async fn delete_customer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/customers", post(create_customer))
        .route("/companies/{company_id}/customers", get(list_customers))
        .route(
            "/companies/{company_id}/customers/search",
            get(search_customers),
        )
        .route(
            "/companies/{company_id}/customers/{id}",
            put(update_customer),
        )
        .route("/customers/{id}", get(get_customer))
        .route("/customers/{id}", delete(delete_customer))
}
