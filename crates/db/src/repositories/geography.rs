//! Geography repository: countries, states, cities.
//!
//! Thin CRUD for the three-level hierarchy. Customers reference these rows
//! as plain integers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use probill_core::context::RequestContext;
use probill_shared::AppError;

use crate::entities::{cities, countries, states};
use crate::repositories::is_foreign_key_violation;

/// Error types for geography operations.
#[derive(Debug, thiserror::Error)]
pub enum GeographyError {
    /// A record with this name already exists within the same parent.
    #[error("{0} \"{1}\" already exists")]
    Duplicate(&'static str, String),

    /// Record not found.
    #[error("{0} not found: {1}")]
    NotFound(&'static str, i64),

    /// Deletion blocked by dependent records.
    #[error("{0} is referenced by other records")]
    InUse(&'static str),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<GeographyError> for AppError {
    fn from(err: GeographyError) -> Self {
        match err {
            GeographyError::Duplicate(_, _) => Self::Conflict(err.to_string()),
            GeographyError::NotFound(_, _) => Self::NotFound(err.to_string()),
            GeographyError::InUse(_) => Self::ReferentialConflict(
                "Cannot delete this record because it is referenced in other records".to_string(),
            ),
            GeographyError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Geography repository.
#[derive(Debug, Clone)]
pub struct GeographyRepository {
    db: DatabaseConnection,
}

impl GeographyRepository {
    /// Creates a new geography repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a country.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` when the name is taken, or a database error.
    pub async fn create_country(
        &self,
        ctx: &RequestContext,
        name: String,
    ) -> Result<countries::Model, GeographyError> {
        let existing = countries::Entity::find()
            .filter(countries::Column::Name.eq(name.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(GeographyError::Duplicate("country", name));
        }

        let now = chrono::Utc::now().into();
        let model = countries::ActiveModel {
            id: NotSet,
            name: Set(name),
            is_active: Set(true),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let country = model.insert(&self.db).await?;
        info!(country_id = country.id, "Country created");
        Ok(country)
    }

    /// Creates a state under a country.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing country, `Duplicate` for a name
    /// collision within the country, or a database error.
    pub async fn create_state(
        &self,
        ctx: &RequestContext,
        country_id: i64,
        name: String,
    ) -> Result<states::Model, GeographyError> {
        countries::Entity::find_by_id(country_id)
            .one(&self.db)
            .await?
            .ok_or(GeographyError::NotFound("country", country_id))?;

        let existing = states::Entity::find()
            .filter(states::Column::CountryId.eq(country_id))
            .filter(states::Column::Name.eq(name.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(GeographyError::Duplicate("state", name));
        }

        let now = chrono::Utc::now().into();
        let model = states::ActiveModel {
            id: NotSet,
            country_id: Set(country_id),
            name: Set(name),
            is_active: Set(true),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let state = model.insert(&self.db).await?;
        info!(state_id = state.id, country_id, "State created");
        Ok(state)
    }

    /// Creates a city under a state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing state, `Duplicate` for a name
    /// collision within the state, or a database error.
    pub async fn create_city(
        &self,
        ctx: &RequestContext,
        state_id: i64,
        name: String,
    ) -> Result<cities::Model, GeographyError> {
        states::Entity::find_by_id(state_id)
            .one(&self.db)
            .await?
            .ok_or(GeographyError::NotFound("state", state_id))?;

        let existing = cities::Entity::find()
            .filter(cities::Column::StateId.eq(state_id))
            .filter(cities::Column::Name.eq(name.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(GeographyError::Duplicate("city", name));
        }

        let now = chrono::Utc::now().into();
        let model = cities::ActiveModel {
            id: NotSet,
            state_id: Set(state_id),
            name: Set(name),
            is_active: Set(true),
            created_by: Set(ctx.actor.clone()),
            created_at: Set(now),
            updated_by: Set(ctx.actor.clone()),
            updated_at: Set(now),
        };

        let city = model.insert(&self.db).await?;
        info!(city_id = city.id, state_id, "City created");
        Ok(city)
    }

    /// Lists all countries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_countries(&self) -> Result<Vec<countries::Model>, GeographyError> {
        Ok(countries::Entity::find()
            .order_by_asc(countries::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists the states of a country.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_states(
        &self,
        country_id: i64,
    ) -> Result<Vec<states::Model>, GeographyError> {
        Ok(states::Entity::find()
            .filter(states::Column::CountryId.eq(country_id))
            .order_by_asc(states::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists the cities of a state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_cities(&self, state_id: i64) -> Result<Vec<cities::Model>, GeographyError> {
        Ok(cities::Entity::find()
            .filter(cities::Column::StateId.eq(state_id))
            .order_by_asc(cities::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Deletes a country.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when states or customers
    /// reference it, or a database error.
    pub async fn delete_country(&self, id: i64) -> Result<(), GeographyError> {
        countries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(GeographyError::NotFound("country", id))?;

        match countries::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_foreign_key_violation(&e) => Err(GeographyError::InUse("country")),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when referenced, or a
    /// database error.
    pub async fn delete_state(&self, id: i64) -> Result<(), GeographyError> {
        states::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(GeographyError::NotFound("state", id))?;

        match states::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_foreign_key_violation(&e) => Err(GeographyError::InUse("state")),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a city.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing, `InUse` when referenced, or a
    /// database error.
    pub async fn delete_city(&self, id: i64) -> Result<(), GeographyError> {
        cities::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(GeographyError::NotFound("city", id))?;

        match cities::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_foreign_key_violation(&e) => Err(GeographyError::InUse("city")),
            Err(e) => Err(e.into()),
        }
    }
}
