//! Tax master repository.
//!
//! Detail rows are derived from the header's (type, rate) and fully
//! regenerated on every header update.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_core::tax::generate_tax_details;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{tax_details, tax_headers};
use crate::repositories::is_foreign_key_violation;

/// Error types for tax master operations.
#[derive(Debug, thiserror::Error)]
pub enum TaxError {
    /// A tax with this name already exists for the company.
    #[error("tax \"{0}\" already exists for this company")]
    DuplicateName(String),

    /// Tax header not found.
    #[error("tax not found: {0}")]
    NotFound(i64),

    /// Deletion blocked by dependent records (products, HSN codes, invoice
    /// lines).
    #[error("tax is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TaxError> for AppError {
    fn from(err: TaxError) -> Self {
        match err {
            TaxError::DuplicateName(_) => Self::Conflict(err.to_string()),
            TaxError::NotFound(_) => Self::NotFound(err.to_string()),
            TaxError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            TaxError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or updating a tax header.
#[derive(Debug, Clone)]
pub struct TaxInput {
    /// Owning company.
    pub company_id: i64,
    /// Tax regime; only "GST" derives slab details.
    pub tax_type: String,
    /// Display name, unique per company.
    pub name: String,
    /// Flat percentage rate.
    pub rate: Decimal,
    /// Active flag.
    pub is_active: bool,
}

/// A tax header with its derived slab details.
#[derive(Debug, Clone)]
pub struct TaxWithDetails {
    /// The header record.
    pub header: tax_headers::Model,
    /// The derived slab rows, in row order.
    pub details: Vec<tax_details::Model>,
}

/// Tax master repository.
#[derive(Debug, Clone)]
pub struct TaxRepository {
    db: DatabaseConnection,
}

impl TaxRepository {
    /// Creates a new tax repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tax header and its derived slab details.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if (company, name) already exists, or a
    /// database error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: TaxInput,
    ) -> Result<TaxWithDetails, TaxError> {
        let existing = tax_headers::Entity::find()
            .filter(tax_headers::Column::CompanyId.eq(input.company_id))
            .filter(tax_headers::Column::Name.eq(input.name.clone()))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(TaxError::DuplicateName(input.name));
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        let header = tax_headers::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            tax_type: Set(input.tax_type),
            name: Set(input.name),
            rate: Set(input.rate),
            is_active: Set(input.is_active),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };
        let header = header.insert(&txn).await?;

        let details = insert_details(&txn, &header).await?;

        txn.commit().await?;

        info!(
            tax_header_id = header.id,
            company_id = header.company_id,
            slabs = details.len(),
            "Tax created"
        );

        Ok(TaxWithDetails { header, details })
    }

    /// Overwrites a tax header and regenerates its details.
    ///
    /// Details are always deleted and rebuilt from the resulting
    /// (type, rate), even when neither changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the header does not exist, `DuplicateName` if
    /// the new name collides, or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: TaxInput,
    ) -> Result<TaxWithDetails, TaxError> {
        let existing = tax_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaxError::NotFound(id))?;

        let collision = tax_headers::Entity::find()
            .filter(tax_headers::Column::CompanyId.eq(input.company_id))
            .filter(tax_headers::Column::Name.eq(input.name.clone()))
            .filter(tax_headers::Column::Id.ne(id))
            .one(&self.db)
            .await?;

        if collision.is_some() {
            return Err(TaxError::DuplicateName(input.name));
        }

        let txn = self.db.begin().await?;

        let mut active: tax_headers::ActiveModel = existing.into();
        active.company_id = Set(input.company_id);
        active.tax_type = Set(input.tax_type);
        active.name = Set(input.name);
        active.rate = Set(input.rate);
        active.is_active = Set(input.is_active);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());
        let header = active.update(&txn).await?;

        tax_details::Entity::delete_many()
            .filter(tax_details::Column::TaxHeaderId.eq(id))
            .exec(&txn)
            .await?;
        let details = insert_details(&txn, &header).await?;

        txn.commit().await?;

        info!(tax_header_id = header.id, "Tax updated, details regenerated");

        Ok(TaxWithDetails { header, details })
    }

    /// Deletes a tax header and its details.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when dependent rows reference
    /// the header, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), TaxError> {
        tax_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaxError::NotFound(id))?;

        let txn = self.db.begin().await?;

        tax_details::Entity::delete_many()
            .filter(tax_details::Column::TaxHeaderId.eq(id))
            .exec(&txn)
            .await?;

        match tax_headers::Entity::delete_by_id(id).exec(&txn).await {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                txn.rollback().await?;
                return Err(TaxError::InUse);
            }
            Err(e) => return Err(e.into()),
        }

        txn.commit().await?;

        info!(tax_header_id = id, "Tax deleted");
        Ok(())
    }

    /// Finds a tax header with details by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<TaxWithDetails>, TaxError> {
        let Some(header) = tax_headers::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let details = self.details_for(header.id).await?;
        Ok(Some(TaxWithDetails { header, details }))
    }

    /// Finds a tax header with details by (company, name).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(
        &self,
        company_id: i64,
        name: &str,
    ) -> Result<Option<TaxWithDetails>, TaxError> {
        let Some(header) = tax_headers::Entity::find()
            .filter(tax_headers::Column::CompanyId.eq(company_id))
            .filter(tax_headers::Column::Name.eq(name))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let details = self.details_for(header.id).await?;
        Ok(Some(TaxWithDetails { header, details }))
    }

    /// Lists tax headers for a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<tax_headers::Model>), TaxError> {
        let filter =
            tax_headers::Entity::find().filter(tax_headers::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let headers = filter
            .order_by_asc(tax_headers::Column::Name)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, headers))
    }

    async fn details_for(&self, header_id: i64) -> Result<Vec<tax_details::Model>, DbErr> {
        tax_details::Entity::find()
            .filter(tax_details::Column::TaxHeaderId.eq(header_id))
            .order_by_asc(tax_details::Column::RowNo)
            .all(&self.db)
            .await
    }
}

/// Derives and inserts the slab rows for a header.
async fn insert_details<C: sea_orm::ConnectionTrait>(
    conn: &C,
    header: &tax_headers::Model,
) -> Result<Vec<tax_details::Model>, DbErr> {
    let slabs = generate_tax_details(&header.tax_type, header.rate);
    let mut inserted = Vec::with_capacity(slabs.len());

    for slab in slabs {
        let model = tax_details::ActiveModel {
            id: NotSet,
            tax_header_id: Set(header.id),
            row_no: Set(slab.row_no),
            supply: Set(slab.supply.into()),
            slab_name: Set(slab.name),
            rate: Set(slab.rate),
        };
        inserted.push(model.insert(conn).await?);
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy_mapping() {
        assert!(matches!(
            AppError::from(TaxError::DuplicateName("GST 18".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(TaxError::NotFound(1)),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(TaxError::InUse),
            AppError::ReferentialConflict(_)
        ));
    }
}
