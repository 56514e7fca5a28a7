//! HSN code routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::repositories::hsn::{HsnInput, HsnRepository};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating or overwriting an HSN entry.
#[derive(Debug, Deserialize, Validate)]
pub struct HsnRequest {
    /// HSN classification code, unique per company.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Description of the goods class.
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    /// Tax applied to this classification.
    pub tax_header_id: i64,
    /// Denormalized tax rate.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Date the classification takes effect.
    pub effective_date: NaiveDate,
    /// Active flag; defaults to true.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl HsnRequest {
    fn into_input(self, company_id: i64) -> HsnInput {
        HsnInput {
            company_id,
            code: self.code,
            description: self.description,
            tax_header_id: self.tax_header_id,
            tax_rate: self.tax_rate,
            effective_date: self.effective_date,
            is_active: self.is_active,
        }
    }
}

/// POST `/companies/{company_id}/hsn-codes` - Create an HSN entry.
async fn create_hsn(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<HsnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = HsnRepository::new((*state.db).clone());
    let hsn = repo
        .create(&auth.context(), payload.into_input(company_id))
        .await?;

    Ok((StatusCode::CREATED, Json(hsn)))
}

/// GET `/companies/{company_id}/hsn-codes` - List HSN entries.
async fn list_hsn(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = HsnRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/hsn-codes/{id}` - Fetch one HSN entry.
async fn get_hsn(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = HsnRepository::new((*state.db).clone());
    let hsn = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("hsn code {id}")))?;
    Ok(Json(hsn))
}

/// PUT `/companies/{company_id}/hsn-codes/{id}` - Overwrite an HSN entry.
async fn update_hsn(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<HsnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = HsnRepository::new((*state.db).clone());
    let hsn = repo
        .update(&auth.context(), id, payload.into_input(company_id))
        .await?;

    Ok(Json(hsn))
}

/// DELETE `/hsn-codes/{id}` - Delete an HSN entry.
async fn delete_hsn(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = HsnRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the HSN routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/hsn-codes", post(create_hsn))
        .route("/companies/{company_id}/hsn-codes", get(list_hsn))
        .route("/companies/{company_id}/hsn-codes/{id}", put(update_hsn))
        .route("/hsn-codes/{id}", get(get_hsn))
        .route("/hsn-codes/{id}", delete(delete_hsn))
}
