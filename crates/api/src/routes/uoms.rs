//! Unit-of-measure routes.

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
use probill_db::repositories::uom::{UomInput, UomRepository};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating or overwriting a UOM.
#[derive(Debug, Deserialize, Validate)]
pub struct UomRequest {
    /// Display name (e.g. "Kilogram").
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Short code, unique per company (e.g. "KG").
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Active flag; defaults to true.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// POST `/companies/{company_id}/uoms` - Create a UOM.
async fn create_uom(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<UomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = UomRepository::new((*state.db).clone());
    let uom = repo
        .create(
            &auth.context(),
            UomInput {
                company_id,
                name: payload.name,
                code: payload.code,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(uom)))
}

/// GET `/companies/{company_id}/uoms` - List UOMs.
async fn list_uoms(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UomRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/uoms/{id}` - Fetch one UOM.
async fn get_uom(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UomRepository::new((*state.db).clone());
    let uom = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("uom {id}")))?;
    Ok(Json(uom))
}

/// PUT `/companies/{company_id}/uoms/{id}` - Overwrite a UOM.
async fn update_uom(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, id)): Path<(i64, i64)>,
    Json(payload): Json<UomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = UomRepository::new((*state.db).clone());
    let uom = repo
        .update(
            &auth.context(),
            id,
            UomInput {
                company_id,
                name: payload.name,
                code: payload.code,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(uom))
}

/// DELETE `/uoms/{id}` - Delete a UOM.
async fn delete_uom(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UomRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the UOM routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/uoms", post(create_uom))
        .route("/companies/{company_id}/uoms", get(list_uoms))
        .route("/companies/{company_id}/uoms/{id}", put(update_uom))
        .route("/uoms/{id}", get(get_uom))
        .route("/uoms/{id}", delete(delete_uom))
}
