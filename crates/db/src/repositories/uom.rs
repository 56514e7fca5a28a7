//! Unit-of-measure repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::uoms;
use crate::repositories::is_foreign_key_violation;

/// Error types for UOM operations.
#[derive(Debug, thiserror::Error)]
pub enum UomError {
    /// A UOM with this code already exists for the company.
    #[error("uom code \"{0}\" already exists for this company")]
    DuplicateCode(String),

    /// UOM not found.
    #[error("uom not found: {0}")]
    NotFound(i64),

    /// Deletion blocked by dependent records.
    #[error("uom is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UomError> for AppError {
    fn from(err: UomError) -> Self {
        match err {
            UomError::DuplicateCode(_) => Self::Conflict(err.to_string()),
            UomError::NotFound(_) => Self::NotFound(err.to_string()),
            UomError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            UomError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or overwriting a UOM.
#[derive(Debug, Clone)]
pub struct UomInput {
    /// Owning company.
    pub company_id: i64,
    /// Display name (e.g. "Kilogram").
    pub name: String,
    /// Short code, unique per company (e.g. "KG").
    pub code: String,
    /// Active flag.
    pub is_active: bool,
}

/// UOM repository.
#[derive(Debug, Clone)]
pub struct UomRepository {
    db: DatabaseConnection,
}

impl UomRepository {
    /// Creates a new UOM repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a UOM.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` when (company, code) is taken, or a database
    /// error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: UomInput,
    ) -> Result<uoms::Model, UomError> {
        let existing = uoms::Entity::find()
            .filter(uoms::Column::CompanyId.eq(input.company_id))
            .filter(uoms::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(UomError::DuplicateCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let model = uoms::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            name: Set(input.name),
            code: Set(input.code),
            is_active: Set(input.is_active),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let uom = model.insert(&self.db).await?;
        info!(uom_id = uom.id, company_id = uom.company_id, "UOM created");
        Ok(uom)
    }

    /// Overwrites a UOM's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `DuplicateCode` on a collision, or a
    /// database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: UomInput,
    ) -> Result<uoms::Model, UomError> {
        let existing = uoms::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UomError::NotFound(id))?;

        let collision = uoms::Entity::find()
            .filter(uoms::Column::CompanyId.eq(input.company_id))
            .filter(uoms::Column::Code.eq(input.code.clone()))
            .filter(uoms::Column::Id.ne(id))
            .one(&self.db)
            .await?;
        if collision.is_some() {
            return Err(UomError::DuplicateCode(input.code));
        }

        let mut active: uoms::ActiveModel = existing.into();
        active.company_id = Set(input.company_id);
        active.name = Set(input.name);
        active.code = Set(input.code);
        active.is_active = Set(input.is_active);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());

        let uom = active.update(&self.db).await?;
        info!(uom_id = uom.id, "UOM updated");
        Ok(uom)
    }

    /// Deletes a UOM.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when products or invoice
    /// lines reference the UOM, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), UomError> {
        uoms::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UomError::NotFound(id))?;

        match uoms::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => {
                info!(uom_id = id, "UOM deleted");
                Ok(())
            }
            Err(e) if is_foreign_key_violation(&e) => Err(UomError::InUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a UOM by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<uoms::Model>, UomError> {
        Ok(uoms::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists UOMs for a company, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<uoms::Model>), UomError> {
        let filter = uoms::Entity::find().filter(uoms::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let rows = filter
            .order_by_asc(uoms::Column::Code)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }
}
