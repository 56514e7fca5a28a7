//! Product repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;
use probill_shared::types::ListQuery;

use crate::entities::{products, tax_headers, uoms};
use crate::repositories::is_foreign_key_violation;

/// Error types for product operations.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// A product with this code already exists for the company.
    #[error("product code \"{0}\" already exists for this company")]
    DuplicateCode(String),

    /// Product not found.
    #[error("product not found: {0}")]
    NotFound(i64),

    /// A referenced master-data record does not exist.
    #[error("{0} not found: {1}")]
    ReferenceNotFound(&'static str, i64),

    /// Deletion blocked by dependent records.
    #[error("product is referenced by other records")]
    InUse,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::DuplicateCode(_) => Self::Conflict(err.to_string()),
            ProductError::NotFound(_) => Self::NotFound(err.to_string()),
            ProductError::ReferenceNotFound(_, _) => Self::Validation(err.to_string()),
            ProductError::InUse => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            ProductError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or overwriting a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    /// Owning company.
    pub company_id: i64,
    /// Short code, unique per company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form specification.
    pub specification: Option<String>,
    /// UOM used when selling.
    pub selling_uom_id: i64,
    /// UOM used when purchasing.
    pub purchase_uom_id: i64,
    /// Selling price.
    pub selling_price: Decimal,
    /// Cost price.
    pub cost_price: Decimal,
    /// HSN classification code.
    pub hsn_code: Option<String>,
    /// Default tax applied to the product.
    pub tax_header_id: i64,
    /// Denormalized tax rate.
    pub tax_rate: Decimal,
    /// Active flag.
    pub is_active: bool,
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` when (company, code) is taken,
    /// `ReferenceNotFound` for dangling UOM/tax references, or a database
    /// error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: ProductInput,
    ) -> Result<products::Model, ProductError> {
        let existing = products::Entity::find()
            .filter(products::Column::CompanyId.eq(input.company_id))
            .filter(products::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ProductError::DuplicateCode(input.code));
        }

        self.check_references(&input).await?;

        let now = chrono::Utc::now().into();
        let model = products::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            code: Set(input.code),
            name: Set(input.name),
            specification: Set(input.specification),
            selling_uom_id: Set(input.selling_uom_id),
            purchase_uom_id: Set(input.purchase_uom_id),
            selling_price: Set(input.selling_price),
            cost_price: Set(input.cost_price),
            hsn_code: Set(input.hsn_code),
            tax_header_id: Set(input.tax_header_id),
            tax_rate: Set(input.tax_rate),
            is_active: Set(input.is_active),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let product = model.insert(&self.db).await?;
        info!(product_id = product.id, company_id = product.company_id, "Product created");
        Ok(product)
    }

    /// Overwrites a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `DuplicateCode` on a collision,
    /// `ReferenceNotFound` for dangling references, or a database error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: ProductInput,
    ) -> Result<products::Model, ProductError> {
        let existing = products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let collision = products::Entity::find()
            .filter(products::Column::CompanyId.eq(input.company_id))
            .filter(products::Column::Code.eq(input.code.clone()))
            .filter(products::Column::Id.ne(id))
            .one(&self.db)
            .await?;
        if collision.is_some() {
            return Err(ProductError::DuplicateCode(input.code));
        }

        self.check_references(&input).await?;

        let mut active: products::ActiveModel = existing.into();
        active.company_id = Set(input.company_id);
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.specification = Set(input.specification);
        active.selling_uom_id = Set(input.selling_uom_id);
        active.purchase_uom_id = Set(input.purchase_uom_id);
        active.selling_price = Set(input.selling_price);
        active.cost_price = Set(input.cost_price);
        active.hsn_code = Set(input.hsn_code);
        active.tax_header_id = Set(input.tax_header_id);
        active.tax_rate = Set(input.tax_rate);
        active.is_active = Set(input.is_active);
        active.updated_by = Set(ctx.actor.clone());
        active.updated_at = Set(chrono::Utc::now().into());

        let product = active.update(&self.db).await?;
        info!(product_id = product.id, "Product updated");
        Ok(product)
    }

    /// Deletes a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when invoice lines reference
    /// the product, or a database error.
    pub async fn delete(&self, id: i64) -> Result<(), ProductError> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        match products::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => {
                info!(product_id = id, "Product deleted");
                Ok(())
            }
            Err(e) if is_foreign_key_violation(&e) => Err(ProductError::InUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<products::Model>, ProductError> {
        Ok(products::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists products for a company, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: i64,
        query: ListQuery,
    ) -> Result<(u64, Vec<products::Model>), ProductError> {
        let filter = products::Entity::find().filter(products::Column::CompanyId.eq(company_id));

        let total = filter.clone().count(&self.db).await?;

        let rows = filter
            .order_by_asc(products::Column::Name)
            .offset(query.skip)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok((total, rows))
    }

    /// Searches products of a company by name substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_by_name(
        &self,
        company_id: i64,
        value: &str,
    ) -> Result<Vec<products::Model>, ProductError> {
        let rows = products::Entity::find()
            .filter(products::Column::CompanyId.eq(company_id))
            .filter(products::Column::Name.contains(value))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    async fn check_references(&self, input: &ProductInput) -> Result<(), ProductError> {
        for (what, uom_id) in [
            ("selling uom", input.selling_uom_id),
            ("purchase uom", input.purchase_uom_id),
        ] {
            if uoms::Entity::find_by_id(uom_id).one(&self.db).await?.is_none() {
                return Err(ProductError::ReferenceNotFound(what, uom_id));
            }
        }

        if tax_headers::Entity::find_by_id(input.tax_header_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ProductError::ReferenceNotFound("tax", input.tax_header_id));
        }
        Ok(())
    }
}
