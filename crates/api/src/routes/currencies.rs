//! Currency management routes.

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
use probill_db::repositories::currency::{
    CreateCurrencyInput, CurrencyRepository, UpdateCurrencyInput,
};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating a currency.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCurrencyRequest {
    /// Full name, unique.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// ISO-style code, unique.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Display symbol.
    pub symbol: Option<String>,
}

/// Request body for updating a currency; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateCurrencyRequest {
    /// New name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New symbol.
    pub symbol: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// POST `/currencies` - Create a currency.
async fn create_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = CurrencyRepository::new((*state.db).clone());
    let currency = repo
        .create(
            &auth.context(),
            CreateCurrencyInput {
                name: payload.name,
                code: payload.code,
                symbol: payload.symbol,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(currency)))
}

/// GET `/currencies` - List currencies.
async fn list_currencies(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let (total, items) = repo.list(query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/currencies/{id}` - Fetch one currency.
async fn get_currency(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let currency = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("currency {id}")))?;
    Ok(Json(currency))
}

/// PATCH `/currencies/{id}` - Apply field changes.
async fn update_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    let currency = repo
        .update(
            &auth.context(),
            id,
            UpdateCurrencyInput {
                name: payload.name,
                code: payload.code,
                symbol: payload.symbol,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(currency))
}

/// DELETE `/currencies/{id}` - Delete a currency.
async fn delete_currency(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CurrencyRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", post(create_currency))
        .route("/currencies", get(list_currencies))
        .route("/currencies/{id}", get(get_currency))
        .route("/currencies/{id}", patch(update_currency))
        .route("/currencies/{id}", delete(delete_currency))
}
