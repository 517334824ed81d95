//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use credhub_core::error::{AppError, ErrorKind};
use credhub_core::result::AppResult;
use credhub_entity::user::{CreateUser, User, UserRole};

/// Repository for user rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// A duplicate email violates the unique index and maps to `Conflict`.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, role) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::conflict("Email already registered")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email. Exact match: emails are stored case-sensitively
    /// and any case folding is a caller concern.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Set a user's role, returning the updated row or `None` if the user
    /// does not exist.
    pub async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("UPDATE users SET role = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set user role", e))
    }
}
