//! Geography routes: countries, states, cities.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_db::GeographyRepository;

/// Request body naming a geography record.
#[derive(Debug, Deserialize, Validate)]
pub struct NameRequest {
    /// Display name.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// POST `/countries` - Create a country.
async fn create_country(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = GeographyRepository::new((*state.db).clone());
    let country = repo.create_country(&auth.context(), payload.name).await?;
    Ok((StatusCode::CREATED, Json(country)))
}

/// GET `/countries` - List countries.
async fn list_countries(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = GeographyRepository::new((*state.db).clone());
    Ok(Json(repo.list_countries().await?))
}

/// DELETE `/countries/{id}` - Delete a country.
async fn delete_country(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = GeographyRepository::new((*state.db).clone());
    repo.delete_country(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/countries/{country_id}/states` - Create a state.
async fn create_state(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(country_id): Path<i64>,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = GeographyRepository::new((*state.db).clone());
    let created = repo
        .create_state(&auth.context(), country_id, payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/countries/{country_id}/states` - List the states of a country.
async fn list_states(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(country_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = GeographyRepository::new((*state.db).clone());
    Ok(Json(repo.list_states(country_id).await?))
}

/// DELETE `/states/{id}` - Delete a state.
async fn delete_state(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = GeographyRepository::new((*state.db).clone());
    repo.delete_state(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/states/{state_id}/cities` - Create a city.
async fn create_city(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(state_id): Path<i64>,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = GeographyRepository::new((*state.db).clone());
    let created = repo
        .create_city(&auth.context(), state_id, payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/states/{state_id}/cities` - List the cities of a state.
async fn list_cities(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(state_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = GeographyRepository::new((*state.db).clone());
    Ok(Json(repo.list_cities(state_id).await?))
}

/// DELETE `/cities/{id}` - Delete a city.
async fn delete_city(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = GeographyRepository::new((*state.db).clone());
    repo.delete_city(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates the geography routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/countries", post(create_country))
        .route("/countries", get(list_countries))
        .route("/countries/{country_id}", delete(delete_country))
        .route("/countries/{country_id}/states", post(create_state))
        .route("/countries/{country_id}/states", get(list_states))
        .route("/states/{state_id}", delete(delete_state))
        .route("/states/{state_id}/cities", post(create_city))
        .route("/states/{state_id}/cities", get(list_cities))
        .route("/cities/{id}", delete(delete_city))
}
