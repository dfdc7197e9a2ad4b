//! User repository.
//!
//! Lookups are always by normalized (lowercased) email or by id. The upsert
//! path backs invitation acceptance, where an existing account gets a new
//! password instead of a duplicate row.

use crate::auth::user::{User, UserWithHash};
use crate::domain::UserId;
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_raw(row.id),
            email: row.email,
            name: row.name,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<UserRow> for UserWithHash {
    fn from(row: UserRow) -> Self {
        let password_hash = row.password_hash.clone();
        UserWithHash { user: row.into(), password_hash }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user with their password hash for credential checks
    async fn find_by_email_with_hash(&self, email: &str) -> Result<Option<UserWithHash>>;

    /// Create the user for this email, or refresh its password and
    /// reactivate it if the email is already registered.
    async fn upsert_by_email(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User>;
}

pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, format!("fetch user {}", id)))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, "fetch user by email"))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, email))]
    async fn find_by_email_with_hash(&self, email: &str) -> Result<Option<UserWithHash>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, "fetch user credentials"))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, email, name, password_hash))]
    async fn upsert_by_email(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, name, password_hash, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 1, $5, $6)
            ON CONFLICT(email) DO UPDATE SET
                password_hash = excluded.password_hash,
                active = 1,
                name = COALESCE(excluded.name, users.name),
                updated_at = excluded.updated_at
            RETURNING *",
        )
        .bind(UserId::new().into_string())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "upsert user"))?;

        Ok(row.into())
    }
}
