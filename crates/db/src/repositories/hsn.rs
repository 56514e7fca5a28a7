//! HSN code repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{hsn_codes, tax_headers};
use crate::repositories::is_foreign_key_violation;

/// Error types for HSN operations.
#[derive(Debug, thiserror::Error)]
pub enum HsnError {
    /// An HSN entry with this code already exists for the company.
    #[error("hsn code \"{0}\" already exists for this company")]
    DuplicateCode(String),

    /// HSN entry not found.
    #[error("hsn code not found: {0}")]
    NotFound(i64),

    /// Referenced tax header does not exist.
    #[error("tax not found: {0}")]
    TaxNotFound(i64),

    /// Deletion blocked by dependent records.
    #[error("hsn code is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<HsnError> for AppError {
    fn from(err: HsnError) -> Self {
        match err {
            HsnError::DuplicateCode(_) => Self::Conflict(err.to_string()),
            HsnError::NotFound(_) => Self::NotFound(err.to_string()),
            HsnError::TaxNotFound(_) => Self::Validation(err.to_string()),
            HsnError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            HsnError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or overwriting an HSN entry.
#[derive(Debug, Clone)]
pub struct HsnInput {
    /// Owning company.
    pub company_id: i64,
    /// HSN classification code, unique per company.
    pub code: String,
    /// Description of the goods class.
    pub description: String,
    /// Tax applied to this classification.
    pub tax_header_id: i64,
    /// Denormalized tax rate.
    pub tax_rate: Decimal,
    /// Date the classification takes effect.
    pub effective_date: NaiveDate,
    /// Active flag.
    pub is_active: bool,
}

/// HSN repository.
#[derive(Debug, Clone)]
pub struct HsnRepository {
    db: DatabaseConnection,
}

impl HsnRepository {
    /// Creates a new HSN repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an HSN entry.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` when (company, code) is taken, `TaxNotFound`
    /// for a dangling tax reference, or a database error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: HsnInput,
    ) -> Result<hsn_codes::Model, HsnError> {
        let existing = hsn_codes::Entity::find()
            .filter(hsn_codes::Column::CompanyId.eq(input.company_id))
            .filter(hsn_codes::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(HsnError::DuplicateCode(input.code));
        }

        self.check_tax(input.tax_header_id).await?;

        let now = chrono::Utc::now().into();
        let model = hsn_codes::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            code: Set(input.code),
            description: Set(input.description),
            tax_header_id: Set(input.tax_header_id),
            tax_rate: Set(input.tax_rate),
            effective_date: Set(input.effective_date),
            is_active: Set(input.is_active),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let hsn = model.insert(&self.db).await?;
        info!(hsn_id = hsn.id, company_id = hsn.company_id, "HSN code created");
        Ok(hsn)
    }

    /// Overwrites an HSN entry's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `DuplicateCode` on a collision,
    /// `TaxNotFound` for a dangling tax reference, or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: HsnInput,
    ) -> Result<hsn_codes::Model, HsnError> {
        let existing = hsn_codes::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HsnError::NotFound(id))?;

        let collision = hsn_codes::Entity::find()
            .filter(hsn_codes::Column::CompanyId.eq(input.company_id))
            .filter(hsn_codes::Column::Code.eq(input.code.clone()))
            .filter(hsn_codes::Column::Id.ne(id))
            .one(&self.db)
            .await?;
        if collision.is_some() {
            return Err(HsnError::DuplicateCode(input.code));
        }

        self.check_tax(input.tax_header_id).await?;

        let mut active: hsn_codes::ActiveModel = existing.into();
        active.company_id = Set(input.company_id);
        active.code = Set(input.code);
        active.description = Set(input.description);
        active.tax_header_id = Set(input.tax_header_id);
        active.tax_rate = Set(input.tax_rate);
        active.effective_date = Set(input.effective_date);
        active.is_active = Set(input.is_active);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());

        let hsn = active.update(&self.db).await?;
        info!(hsn_id = hsn.id, "HSN code updated");
        Ok(hsn)
    }

    /// Deletes an HSN entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when referenced, or a
    /// database error.
    pub async fn delete(&self, id: i64) -> Result<(), HsnError> {
        hsn_codes::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(HsnError::NotFound(id))?;

        match hsn_codes::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => {
                info!(hsn_id = id, "HSN code deleted");
                Ok(())
            }
            Err(e) if is_foreign_key_violation(&e) => Err(HsnError::InUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds an HSN entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<hsn_codes::Model>, HsnError> {
        Ok(hsn_codes::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists HSN entries for a company, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<hsn_codes::Model>), HsnError> {
        let filter =
            hsn_codes::Entity::find().filter(hsn_codes::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let rows = filter
            .order_by_asc(hsn_codes::Column::Code)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }

    async fn check_tax(&self, tax_header_id: i64) -> Result<(), HsnError> {
        if tax_headers::Entity::find_by_id(tax_header_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(HsnError::TaxNotFound(tax_header_id));
        }
        Ok(())
    }
}
