//! Company repository. Companies are the tenant roots.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{companies, currencies};
use crate::repositories::is_foreign_key_violation;

/// Error types for company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// A company with this code already exists.
    #[error("company code \"{0}\" already exists")]
    DuplicateCode(String),

    /// Company not found.
    #[error("company not found: {0}")]
    NotFound(i64),

    /// Referenced currency does not exist.
    #[error("currency not found: {0}")]
    CurrencyNotFound(i64),

    /// Deletion blocked by dependent records.
    #[error("company is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CompanyError> for AppError {
    fn from(err: CompanyError) -> Self {
        match err {
            CompanyError::DuplicateCode(_) => Self::Conflict(err.to_string()),
            CompanyError::NotFound(_) => Self::NotFound(err.to_string()),
            CompanyError::CurrencyNotFound(_) => Self::Validation(err.to_string()),
            CompanyError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            CompanyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Legal name.
    pub name: String,
    /// Short code, unique across the system.
    pub code: String,
    /// Registered address.
    pub address: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Contact person.
    pub contact_person: Option<String>,
    /// GST registration number.
    pub gst_no: Option<String>,
    /// Base currency reference.
    pub currency_id: Option<i64>,
}

/// Field changes for a company update. `None` leaves a field as-is.
#[derive(Debug, Clone, Default)]
pub struct UpdateCompanyInput {
    /// New legal name.
    pub name: Option<String>,
    /// New short code.
    pub code: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New e-mail.
    pub email: Option<String>,
    /// New contact person.
    pub contact_person: Option<String>,
    /// New GST number.
    pub gst_no: Option<String>,
    /// New base currency reference.
    pub currency_id: Option<i64>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Company repository.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` when the code is taken, `CurrencyNotFound`
    /// for a dangling currency reference, or a database error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        let existing = companies::Entity::find()
            .filter(companies::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CompanyError::DuplicateCode(input.code));
        }

        if let Some(currency_id) = input.currency_id {
            self.check_currency(currency_id).await?;
        }

        let now = chrono::Utc::now().into();
        let model = companies::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            code: Set(input.code),
            address: Set(input.address),
            phone: Set(input.phone),
            email: Set(input.email),
            contact_person: Set(input.contact_person),
            gst_no: Set(input.gst_no),
            currency_id: Set(input.currency_id),
            is_active: Set(true),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let company = model.insert(&self.db).await?;
        info!(company_id = company.id, code = %company.code, "Company created");
        Ok(company)
    }

    /// Applies field changes to a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `DuplicateCode` on a code collision,
    /// or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        changes: UpdateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        let existing = companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotFound(id))?;

        if let Some(code) = &changes.code {
            let collision = companies::Entity::find()
                .filter(companies::Column::Code.eq(code.clone()))
                .filter(companies::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if collision.is_some() {
                return Err(CompanyError::DuplicateCode(code.clone()));
            }
        }

        if let Some(currency_id) = changes.currency_id {
            self.check_currency(currency_id).await?;
        }

        let mut active: companies::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(code) = changes.code {
            active.code = Set(code);
        }
        if let Some(address) = changes.address {
            active.address = Set(Some(address));
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email));
        }
        if let Some(contact_person) = changes.contact_person {
            active.contact_person = Set(Some(contact_person));
        }
        if let Some(gst_no) = changes.gst_no {
            active.gst_no = Set(Some(gst_no));
        }
        if let Some(currency_id) = changes.currency_id {
            active.currency_id = Set(Some(currency_id));
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());

        let company = active.update(&self.db).await?;
        info!(company_id = company.id, "Company updated");
        Ok(company)
    }

    /// Deletes a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when dependent records
    /// reference the company, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), CompanyError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotFound(id))?;

        match companies::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => {
                info!(company_id = id, "Company deleted");
                Ok(())
            }
            Err(e) if is_foreign_key_violation(&e) => Err(CompanyError::InUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a company by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<companies::Model>, CompanyError> {
        Ok(companies::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists companies, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        query: ListQuery,
    ) -> Result<(u64, Vec<companies::Model>), CompanyError> {
        let total = companies::Entity::find().count(&self.db).await?;

        let rows = companies::Entity::find()
            .order_by_asc(companies::Column::Name)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }

    async fn check_currency(&self, currency_id: i64) -> Result<(), CompanyError> {
        let found = currencies::Entity::find_by_id(currency_id)
            .one(&self.db)
            .await?;
        if found.is_none() {
            return Err(CompanyError::CurrencyNotFound(currency_id));
        }
        Ok(())
    }
}
