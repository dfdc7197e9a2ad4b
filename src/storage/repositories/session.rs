//! Session repository.
//!
//! Sessions are keyed by their opaque token. Expired rows stay until
//! overwritten by operational cleanup; validity is enforced at read time.

use crate::auth::session::Session;
use crate::domain::{OrgId, UserId};
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct SessionRow {
    pub token: String,
    pub user_id: String,
    pub org_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            token: row.token,
            user_id: UserId::from_raw(row.user_id),
            org_id: OrgId::from_raw(row.org_id),
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a session row
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Fetch a session by token, expired or not
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Delete a session by token; unknown tokens are a no-op
    async fn delete_by_token(&self, token: &str) -> Result<()>;
}

pub struct SqlxSessionRepository {
    pool: DbPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    #[instrument(skip(self, session), fields(user_id = %session.user_id, org_id = %session.org_id))]
    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, org_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&session.token)
        .bind(session.user_id.as_str())
        .bind(session.org_id.as_str())
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "create session"))?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, "fetch session"))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, token))]
    async fn delete_by_token(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, "delete session"))?;

        Ok(())
    }
}
