//! Currency repository. Currencies are shared across companies.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::currencies;
use crate::repositories::is_foreign_key_violation;

/// Error types for currency operations.
#[derive(Debug, thiserror::Error)]
pub enum CurrencyError {
    /// Name or code already exists.
    #[error("currency {0} \"{1}\" already exists")]
    Duplicate(&'static str, String),

    /// Currency not found.
    #[error("currency not found: {0}")]
    NotFound(i64),

    /// Deletion blocked by dependent records.
    #[error("currency is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::Duplicate(_, _) => Self::Conflict(err.to_string()),
            CurrencyError::NotFound(_) => Self::NotFound(err.to_string()),
            CurrencyError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            CurrencyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a currency.
#[derive(Debug, Clone)]
pub struct CreateCurrencyInput {
    /// Full name, unique.
    pub name: String,
    /// ISO-style code, unique.
    pub code: String,
    /// Display symbol.
    pub symbol: Option<String>,
}

/// Field changes for a currency update. `None` leaves a field as-is.
#[derive(Debug, Clone, Default)]
pub struct UpdateCurrencyInput {
    /// New name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New symbol.
    pub symbol: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Currency repository.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    db: DatabaseConnection,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a currency.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` when the name or code is taken, or a database
    /// error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateCurrencyInput,
    ) -> Result<currencies::Model, CurrencyError> {
        let name_taken = currencies::Entity::find()
            .filter(currencies::Column::Name.eq(input.name.clone()))
            .one(&self.db)
            .await?;
        if name_taken.is_some() {
            return Err(CurrencyError::Duplicate("name", input.name));
        }

        let code_taken = currencies::Entity::find()
            .filter(currencies::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if code_taken.is_some() {
            return Err(CurrencyError::Duplicate("code", input.code));
        }

        let now = chrono::Utc::now().into();
        let model = currencies::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            code: Set(input.code),
            symbol: Set(input.symbol),
            is_active: Set(true),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let currency = model.insert(&self.db).await?;
        info!(currency_id = currency.id, code = %currency.code, "Currency created");
        Ok(currency)
    }

    /// Applies field changes to a currency.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `Duplicate` on a collision, or a
    /// database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        changes: UpdateCurrencyInput,
    ) -> Result<currencies::Model, CurrencyError> {
        let existing = currencies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CurrencyError::NotFound(id))?;

        if let Some(name) = &changes.name {
            let collision = currencies::Entity::find()
                .filter(currencies::Column::Name.eq(name.clone()))
                .filter(currencies::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if collision.is_some() {
                return Err(CurrencyError::Duplicate("name", name.clone()));
            }
        }
        if let Some(code) = &changes.code {
            let collision = currencies::Entity::find()
                .filter(currencies::Column::Code.eq(code.clone()))
                .filter(currencies::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if collision.is_some() {
                return Err(CurrencyError::Duplicate("code", code.clone()));
            }
        }

        let mut active: currencies::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(code) = changes.code {
            active.code = Set(code);
        }
        if let Some(symbol) = changes.symbol {
            active.symbol = Set(Some(symbol));
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());

        let currency = active.update(&self.db).await?;
        info!(currency_id = currency.id, "Currency updated");
        Ok(currency)
    }

    /// Deletes a currency.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when referenced, or a
    /// database error.
    pub async fn delete(&self, id: i64) -> Result<(), CurrencyError> {
        currencies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CurrencyError::NotFound(id))?;

        match currencies::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => {
                info!(currency_id = id, "Currency deleted");
                Ok(())
            }
            Err(e) if is_foreign_key_violation(&e) => Err(CurrencyError::InUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a currency by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<currencies::Model>, CurrencyError> {
        Ok(currencies::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists currencies, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        query: ListQuery,
    ) -> Result<(u64, Vec<currencies::Model>), CurrencyError> {
        let total = currencies::Entity::find().count(&self.db).await?;

        let rows = currencies::Entity::find()
            .order_by_asc(currencies::Column::Code)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }
}
