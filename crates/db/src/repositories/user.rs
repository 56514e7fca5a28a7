//! User repository for authentication.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    Set,
};
use tracing::info;

use probill_shared::AppError;

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// A user with this e-mail already exists.
    #[error("user with e-mail \"{0}\" already exists")]
    DuplicateEmail(String),

    /// User not found.
    #[error("user not found")]
    NotFound,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(_) => Self::Conflict(err.to_string()),
            UserError::NotFound => Self::NotFound(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` when the e-mail is taken, or a database
    /// error.
    pub async fn create(
        &self,
        email: String,
        password_hash: String,
        full_name: String,
    ) -> Result<users::Model, UserError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(UserError::DuplicateEmail(email));
        }

        let now = chrono::Utc::now().into();
        let model = users::ActiveModel {
            id: NotSet,
            email: Set(email),
            password_hash: Set(password_hash),
            full_name: Set(full_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = model.insert(&self.db).await?;
        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Finds an active user by e-mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }
}
