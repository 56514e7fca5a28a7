//! Customer repository.
//!
//! Geography and currency references are plain integer fields validated for
//! existence at write time; read-side names come from the reporting views.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{cities, countries, currencies, customers, states};
use crate::repositories::is_foreign_key_violation;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// A customer with this code already exists for the company.
    #[error("customer code \"{0}\" already exists for this company")]
    DuplicateCode(String),

    /// Customer not found.
    #[error("customer not found: {0}")]
    NotFound(i64),

    /// A referenced master-data record does not exist.
    #[error("{0} not found: {1}")]
    ReferenceNotFound(&'static str, i64),

    /// Deletion blocked by dependent records.
    #[error("customer is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::DuplicateCode(_) => Self::Conflict(err.to_string()),
            CustomerError::NotFound(_) => Self::NotFound(err.to_string()),
            CustomerError::ReferenceNotFound(_, _) => Self::Validation(err.to_string()),
            CustomerError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            CustomerError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or overwriting a customer.
#[derive(Debug, Clone)]
pub struct CustomerInput {
    /// Owning company.
    pub company_id: i64,
    /// Display name.
    pub name: String,
    /// Short code, unique per company.
    pub code: String,
    /// Billing address line 1.
    pub address1: Option<String>,
    /// Billing address line 2.
    pub address2: Option<String>,
    /// City reference.
    pub city_id: Option<i64>,
    /// State reference.
    pub state_id: Option<i64>,
    /// Country reference.
    pub country_id: Option<i64>,
    /// GST registration number.
    pub gst_no: Option<String>,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Billing currency reference.
    pub currency_id: Option<i64>,
    /// Active flag.
    pub is_active: bool,
}

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` when (company, code) is taken,
    /// `ReferenceNotFound` for dangling geography/currency references, or a
    /// database error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let existing = customers::Entity::find()
            .filter(customers::Column::CompanyId.eq(input.company_id))
            .filter(customers::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CustomerError::DuplicateCode(input.code));
        }

        self.check_references(&input).await?;

        let now = chrono::Utc::now().into();
        let model = customers::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            name: Set(input.name),
            code: Set(input.code),
            address1: Set(input.address1),
            address2: Set(input.address2),
            city_id: Set(input.city_id),
            state_id: Set(input.state_id),
            country_id: Set(input.country_id),
            gst_no: Set(input.gst_no),
            email: Set(input.email),
            phone: Set(input.phone),
            currency_id: Set(input.currency_id),
            is_active: Set(input.is_active),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let customer = model.insert(&self.db).await?;
        info!(customer_id = customer.id, company_id = customer.company_id, "Customer created");
        Ok(customer)
    }

    /// Overwrites a customer's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `DuplicateCode` on a collision,
    /// `ReferenceNotFound` for dangling references, or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: CustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let existing = customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        let collision = customers::Entity::find()
            .filter(customers::Column::CompanyId.eq(input.company_id))
            .filter(customers::Column::Code.eq(input.code.clone()))
            .filter(customers::Column::Id.ne(id))
            .one(&self.db)
            .await?;
        if collision.is_some() {
            return Err(CustomerError::DuplicateCode(input.code));
        }

        self.check_references(&input).await?;

        let mut active: customers::ActiveModel = existing.into();
        active.company_id = Set(input.company_id);
        active.name = Set(input.name);
        active.code = Set(input.code);
        active.address1 = Set(input.address1);
        active.address2 = Set(input.address2);
        active.city_id = Set(input.city_id);
        active.state_id = Set(input.state_id);
        active.country_id = Set(input.country_id);
        active.gst_no = Set(input.gst_no);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.currency_id = Set(input.currency_id);
        active.is_active = Set(input.is_active);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());

        let customer = active.update(&self.db).await?;
        info!(customer_id = customer.id, "Customer updated");
        Ok(customer)
    }

    /// Deletes a customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when invoices or receipts
    /// reference the customer, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), CustomerError> {
        customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        match customers::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => {
                info!(customer_id = id, "Customer deleted");
                Ok(())
            }
            Err(e) if is_foreign_key_violation(&e) => Err(CustomerError::InUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a customer by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<customers::Model>, CustomerError> {
        Ok(customers::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists customers for a company, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<customers::Model>), CustomerError> {
        let filter =
            customers::Entity::find().filter(customers::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let rows = filter
            .order_by_asc(customers::Column::Name)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }

    /// Searches customers of a company by name substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_by_name(
        &self,
        company_id: i64,
        value: &str,
    ) -> Result<Vec<customers::Model>, CustomerError> {
        let rows = customers::Entity::find()
            .filter(customers::Column::CompanyId.eq(company_id))
            .filter(customers::Column::Name.contains(value))
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Existence checks for the plain integer reference fields.
    async fn check_references(&self, input: &CustomerInput) -> Result<(), CustomerError> {
        if let Some(city_id) = input.city_id {
            if cities::Entity::find_by_id(city_id).one(&self.db).await?.is_none() {
                return Err(CustomerError::ReferenceNotFound("city", city_id));
            }
        }
        if let Some(state_id) = input.state_id {
            if states::Entity::find_by_id(state_id).one(&self.db).await?.is_none() {
                return Err(CustomerError::ReferenceNotFound("state", state_id));
            }
        }
        if let Some(country_id) = input.country_id {
            if countries::Entity::find_by_id(country_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(CustomerError::ReferenceNotFound("country", country_id));
            }
        }
        if let Some(currency_id) = input.currency_id {
            if currencies::Entity::find_by_id(currency_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(CustomerError::ReferenceNotFound("currency", currency_id));
            }
        }
        Ok(())
    }
}
