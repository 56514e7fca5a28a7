//! Financial year and period repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use probill_core::calendar::{generate_periods, validate_date_range};
use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{financial_periods, financial_years, sea_orm_active_enums::PeriodStatus};
use crate::repositories::is_foreign_key_violation;

/// Error types for financial year operations.
#[derive(Debug, thiserror::Error)]
pub enum FinancialYearError {
    /// Start date must be before end date.
    #[error("start date must be before end date")]
    InvalidDateRange,

    /// Date range overlaps an existing financial year of the same company.
    #[error("financial year overlaps with existing year: {0}")]
    OverlappingYear(String),

    /// Financial year not found.
    #[error("financial year not found: {0}")]
    NotFound(i64),

    /// Financial period not found.
    #[error("financial period not found: {0}")]
    PeriodNotFound(i64),

    /// Deletion blocked by dependent records elsewhere in the schema.
    #[error("financial year is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<FinancialYearError> for AppError {
    fn from(err: FinancialYearError) -> Self {
        match err {
            FinancialYearError::InvalidDateRange => Self::Validation(err.to_string()),
            FinancialYearError::OverlappingYear(_) => Self::Conflict(err.to_string()),
            FinancialYearError::NotFound(_) | FinancialYearError::PeriodNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            FinancialYearError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            FinancialYearError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a financial year.
#[derive(Debug, Clone)]
pub struct CreateFinancialYearInput {
    /// Owning company.
    pub company_id: i64,
    /// Year name, e.g. "FY 2025-26".
    pub name: String,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year; defaults to one year after `start_date`, less a
    /// day, when omitted.
    pub end_date: Option<NaiveDate>,
}

/// Field changes for a financial year update. `None` leaves a field as-is.
#[derive(Debug, Clone, Default)]
pub struct UpdateFinancialYearInput {
    /// New name.
    pub name: Option<String>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New end date.
    pub end_date: Option<NaiveDate>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// A financial year with its nested periods.
#[derive(Debug, Clone)]
pub struct FinancialYearWithPeriods {
    /// The year header.
    pub year: financial_years::Model,
    /// The periods tiling the year, ordered by period number.
    pub periods: Vec<financial_periods::Model>,
}

/// Financial year repository.
#[derive(Debug, Clone)]
pub struct FinancialYearRepository {
    db: DatabaseConnection,
}

impl FinancialYearRepository {
    /// Creates a new financial year repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a financial year with auto-generated monthly periods.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid, overlaps an existing year
    /// of the same company, or a database operation fails.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateFinancialYearInput,
    ) -> Result<FinancialYearWithPeriods, FinancialYearError> {
        let end_date = input
            .end_date
            .unwrap_or_else(|| default_year_end(input.start_date));

        validate_date_range(input.start_date, end_date)
            .map_err(|_| FinancialYearError::InvalidDateRange)?;

        // Inclusive overlap check, scoped to the company.
        let overlapping = financial_years::Entity::find()
            .filter(financial_years::Column::CompanyId.eq(input.company_id))
            .filter(financial_years::Column::StartDate.lte(end_date))
            .filter(financial_years::Column::EndDate.gte(input.start_date))
            .one(&self.db)
            .await?;

        if let Some(existing) = overlapping {
            return Err(FinancialYearError::OverlappingYear(existing.name));
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        let year = financial_years::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            name: Set(input.name),
            start_date: Set(input.start_date),
            end_date: Set(end_date),
            is_active: Set(true),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };
        let year = year.insert(&txn).await?;

        let periods = insert_periods(&txn, year.id, input.start_date, end_date).await?;

        txn.commit().await?;

        info!(
            financial_year_id = year.id,
            company_id = year.company_id,
            periods = periods.len(),
            "Financial year created"
        );

        Ok(FinancialYearWithPeriods { year, periods })
    }

    /// Updates a financial year, regenerating periods when either date
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the year does not exist, `InvalidDateRange` for
    /// a bad effective range, or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        changes: UpdateFinancialYearInput,
    ) -> Result<FinancialYearWithPeriods, FinancialYearError> {
        let existing = financial_years::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FinancialYearError::NotFound(id))?;

        let effective_start = changes.start_date.unwrap_or(existing.start_date);
        let effective_end = changes.end_date.unwrap_or(existing.end_date);
        let dates_changed =
            effective_start != existing.start_date || effective_end != existing.end_date;

        if dates_changed {
            validate_date_range(effective_start, effective_end)
                .map_err(|_| FinancialYearError::InvalidDateRange)?;

            // Re-run the overlap check against the other years of the company.
            let overlapping = financial_years::Entity::find()
                .filter(financial_years::Column::CompanyId.eq(existing.company_id))
                .filter(financial_years::Column::Id.ne(id))
                .filter(financial_years::Column::StartDate.lte(effective_end))
                .filter(financial_years::Column::EndDate.gte(effective_start))
                .one(&self.db)
                .await?;

            if let Some(other) = overlapping {
                return Err(FinancialYearError::OverlappingYear(other.name));
            }
        }

        let txn = self.db.begin().await?;

        let mut active: financial_years::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        active.start_date = Set(effective_start);
        active.end_date = Set(effective_end);
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());
        let year = active.update(&txn).await?;

        let periods = if dates_changed {
            financial_periods::Entity::delete_many()
                .filter(financial_periods::Column::FinancialYearId.eq(id))
                .exec(&txn)
                .await?;
            insert_periods(&txn, id, effective_start, effective_end).await?
        } else {
            financial_periods::Entity::find()
                .filter(financial_periods::Column::FinancialYearId.eq(id))
                .order_by_asc(financial_periods::Column::PeriodNo)
                .all(&txn)
                .await?
        };

        txn.commit().await?;

        info!(
            financial_year_id = year.id,
            regenerated_periods = dates_changed,
            "Financial year updated"
        );

        Ok(FinancialYearWithPeriods { year, periods })
    }

    /// Deletes a financial year and its periods.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when other records still
    /// reference the year, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), FinancialYearError> {
        financial_years::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FinancialYearError::NotFound(id))?;

        let txn = self.db.begin().await?;

        financial_periods::Entity::delete_many()
            .filter(financial_periods::Column::FinancialYearId.eq(id))
            .exec(&txn)
            .await?;

        let result = financial_years::Entity::delete_by_id(id).exec(&txn).await;
        match result {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                txn.rollback().await?;
                return Err(FinancialYearError::InUse);
            }
            Err(e) => return Err(e.into()),
        }

        txn.commit().await?;

        info!(financial_year_id = id, "Financial year deleted");
        Ok(())
    }

    /// Finds a financial year by id with its periods.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<FinancialYearWithPeriods>, FinancialYearError> {
        let Some(year) = financial_years::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let periods = financial_periods::Entity::find()
            .filter(financial_periods::Column::FinancialYearId.eq(year.id))
            .order_by_asc(financial_periods::Column::PeriodNo)
            .all(&self.db)
            .await?;

        Ok(Some(FinancialYearWithPeriods { year, periods }))
    }

    /// Lists financial years for a company, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<financial_years::Model>), FinancialYearError> {
        let filter = financial_years::Entity::find()
            .filter(financial_years::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let years = filter
            .order_by_desc(financial_years::Column::StartDate)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, years))
    }

    /// Searches financial years of a company by name substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_by_name(
        &self,
        company_id: i64,
        value: &str,
    ) -> Result<Vec<financial_years::Model>, FinancialYearError> {
        let years = financial_years::Entity::find()
            .filter(financial_years::Column::CompanyId.eq(company_id))
            .filter(financial_years::Column::Name.contains(value))
            .order_by_desc(financial_years::Column::StartDate)
            .all(&self.db)
            .await?;

        Ok(years)
    }

    /// Sets the status of a single period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if missing or a database error.
    pub async fn set_period_status(
        &self,
        period_id: i64,
        status: PeriodStatus,
    ) -> Result<financial_periods::Model, FinancialYearError> {
        let period = financial_periods::Entity::find_by_id(period_id)
            .one(&self.db)
            .await?
            .ok_or(FinancialYearError::PeriodNotFound(period_id))?;

        let mut active: financial_periods::ActiveModel = period.into();
        active.status = Set(status);
        let updated = active.update(&self.db).await?;

        Ok(updated)
    }
}

/// Default year end: one calendar year after the start, less a day.
fn default_year_end(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_months(chrono::Months::new(12))
        .and_then(|d| d.pred_opt())
        .unwrap_or(start)
}

/// Generates and inserts the periods for a date range.
async fn insert_periods<C: sea_orm::ConnectionTrait>(
    conn: &C,
    financial_year_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<financial_periods::Model>, DbErr> {
    let generated: Vec<_> = generate_periods(start, end).collect();
    let mut inserted = Vec::with_capacity(generated.len());

    for period in generated {
        let model = financial_periods::ActiveModel {
            id: NotSet,
            financial_year_id: Set(financial_year_id),
            period_no: Set(period.period_no),
            name: Set(period.name),
            start_date: Set(period.start_date),
            end_date: Set(period.end_date),
            status: Set(period.status.into()),
        };
        inserted.push(model.insert(conn).await?);
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use probill_core::calendar::date_ranges_overlap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_year_end() {
        assert_eq!(default_year_end(date(2025, 4, 1)), date(2026, 3, 31));
        assert_eq!(default_year_end(date(2025, 1, 1)), date(2025, 12, 31));
    }

    #[test]
    fn test_overlap_predicate_matches_inclusive_rule() {
        // The repository's query mirrors this pure predicate.
        assert!(date_ranges_overlap(
            date(2024, 4, 1),
            date(2025, 3, 31),
            date(2024, 10, 1),
            date(2025, 1, 1),
        ));
    }

    #[test]
    fn test_error_taxonomy_mapping() {
        assert!(matches!(
            AppError::from(FinancialYearError::InvalidDateRange),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(FinancialYearError::OverlappingYear("FY".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(FinancialYearError::NotFound(1)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(FinancialYearError::InUse),
            AppError::ReferentialConflict(_)
        ));
    }
}
