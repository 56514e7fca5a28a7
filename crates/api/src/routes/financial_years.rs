//! Financial year and period routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use probill_core::calendar::{GeneratedPeriod, generate_periods, validate_date_range};
use probill_db::entities::{financial_periods, financial_years, sea_orm_active_enums::PeriodStatus};
use probill_db::repositories::financial_year::{
    CreateFinancialYearInput, FinancialYearRepository, FinancialYearWithPeriods,
    UpdateFinancialYearInput,
};
use probill_shared::types::{ListQuery, ListResponse};

/// Request body for creating a financial year.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFinancialYearRequest {
    /// Year name, e.g. "FY 2025-26".
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year; defaults to a year after the start, less a day.
    pub end_date: Option<NaiveDate>,
}

/// Request body for updating a financial year; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateFinancialYearRequest {
    /// New name.
    pub name: Option<String>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New end date.
    pub end_date: Option<NaiveDate>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Request body for previewing period generation without persisting.
#[derive(Debug, Deserialize)]
pub struct PreviewPeriodsRequest {
    /// First day of the range.
    pub start_date: NaiveDate,
    /// Last day of the range.
    pub end_date: NaiveDate,
}

/// Request body for changing a period's status.
#[derive(Debug, Deserialize)]
pub struct PeriodStatusRequest {
    /// New status: "Open" or "Closed".
    pub status: PeriodStatus,
}

/// Response for a financial year with nested periods.
#[derive(Debug, Serialize)]
pub struct FinancialYearResponse {
    /// The year header.
    pub year: financial_years::Model,
    /// The periods tiling the year.
    pub periods: Vec<financial_periods::Model>,
}

impl From<FinancialYearWithPeriods> for FinancialYearResponse {
    fn from(fy: FinancialYearWithPeriods) -> Self {
        Self {
            year: fy.year,
            periods: fy.periods,
        }
    }
}

/// POST `/companies/{company_id}/financial-years` - Create a year with
/// auto-generated monthly periods.
async fn create_financial_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(payload): Json<CreateFinancialYearRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = FinancialYearRepository::new((*state.db).clone());
    let created = repo
        .create(
            &auth.context(),
            CreateFinancialYearInput {
                company_id,
                name: payload.name,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FinancialYearResponse::from(created)),
    ))
}

/// GET `/companies/{company_id}/financial-years` - List years.
async fn list_financial_years(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    let (total, items) = repo.list(company_id, query).await?;
    Ok(Json(ListResponse::new(total, items)))
}

/// GET `/companies/{company_id}/financial-years/search` - Search by name.
async fn search_financial_years(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    Ok(Json(repo.search_by_name(company_id, &query.value).await?))
}

/// Query string for searches.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match.
    pub value: String,
}

/// GET `/financial-years/{id}` - Fetch one year with its periods.
async fn get_financial_year(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    let fy = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("financial year {id}")))?;
    Ok(Json(FinancialYearResponse::from(fy)))
}

/// PATCH `/financial-years/{id}` - Apply field changes; periods are
/// regenerated when either date changes.
async fn update_financial_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFinancialYearRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    let updated = repo
        .update(
            &auth.context(),
            id,
            UpdateFinancialYearInput {
                name: payload.name,
                start_date: payload.start_date,
                end_date: payload.end_date,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(FinancialYearResponse::from(updated)))
}

/// DELETE `/financial-years/{id}` - Delete a year and its periods.
async fn delete_financial_year(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/financial-periods/preview` - Generate periods for a range
/// without persisting anything.
async fn preview_periods(
    _auth: AuthUser,
    Json(payload): Json<PreviewPeriodsRequest>,
) -> Result<Json<Vec<GeneratedPeriod>>, ApiError> {
    validate_date_range(payload.start_date, payload.end_date)
        .map_err(ApiError::validation)?;

    let periods: Vec<GeneratedPeriod> =
        generate_periods(payload.start_date, payload.end_date).collect();
    Ok(Json(periods))
}

/// PATCH `/financial-periods/{id}/status` - Open or close one period.
async fn set_period_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<PeriodStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    let period = repo.set_period_status(id, payload.status).await?;
    Ok(Json(period))
}

/// Creates the financial calendar routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/financial-years",
            post(create_financial_year),
        )
        .route(
            "/companies/{company_id}/financial-years",
            get(list_financial_years),
        )
        .route(
            "/companies/{company_id}/financial-years/search",
            get(search_financial_years),
        )
        .route("/financial-years/{id}", get(get_financial_year))
        .route("/financial-years/{id}", patch(update_financial_year))
        .route("/financial-years/{id}", delete(delete_financial_year))
        .route("/financial-periods/preview", post(preview_periods))
        .route("/financial-periods/{id}/status", patch(set_period_status))
}
