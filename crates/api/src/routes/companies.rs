//! Company management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::repositories::company::{
    CompanyRepository, CreateCompanyInput, UpdateCompanyInput,
};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating a company.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    /// Legal name.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Short code, unique across the system.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Registered address.
    pub address: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact e-mail.
    #[validate(email)]
    pub email: Option<String>,
    /// Contact person.
    pub contact_person: Option<String>,
    /// GST registration number.
    pub gst_no: Option<String>,
    /// Base currency reference.
    pub currency_id: Option<i64>,
}

/// Request body for updating a company; absent fields stay unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    /// New legal name.
    pub name: Option<String>,
    /// New short code.
    pub code: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New e-mail.
    #[validate(email)]
    pub email: Option<String>,
    /// New contact person.
    pub contact_person: Option<String>,
    /// New GST number.
    pub gst_no: Option<String>,
    /// New base currency reference.
    pub currency_id: Option<i64>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// POST `/companies` - Create a company.
async fn create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = CompanyRepository::new((*state.db).clone());
    let company = repo
        .create(
            &auth.context(),
            CreateCompanyInput {
                name: payload.name,
                code: payload.code,
                address: payload.address,
                phone: payload.phone,
                email: payload.email,
                contact_person: payload.contact_person,
                gst_no: payload.gst_no,
                currency_id: payload.currency_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

/// GET `/companies` - List companies.
async fn list_companies(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CompanyRepository::new((*state.db).clone());
    let (total, items) = repo.list(query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{id}` - Fetch one company.
async fn get_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CompanyRepository::new((*state.db).clone());
    let company = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("company {id}")))?;
    Ok(Json(company))
}

/// PATCH `/companies/{id}` - Apply field changes.
async fn update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = CompanyRepository::new((*state.db).clone());
    let company = repo
        .update(
            &auth.context(),
            id,
            UpdateCompanyInput {
                name: payload.name,
                code: payload.code,
                address: payload.address,
                phone: payload.phone,
                email: payload.email,
                contact_person: payload.contact_person,
                gst_no: payload.gst_no,
                currency_id: payload.currency_id,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(company))
}

/// DELETE `/companies/{id}` - Delete a company.
async fn delete_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CompanyRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", post(create_company))
        .route("/companies", get(list_companies))
        .route("/companies/{company_id}", get(get_company))
        .route("/companies/{company_id}", patch(update_company))
        .route("/companies/{company_id}", delete(delete_company))
}
