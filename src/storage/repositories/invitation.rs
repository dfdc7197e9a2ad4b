//! Invitation repository.

use crate::auth::invitation::Invitation;
use crate::auth::organization::Role;
use crate::domain::{InvitationId, OrgId, UserId};
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct InvitationRow {
    pub id: String,
    pub org_id: String,
    pub email: String,
    pub role: String,
    pub token: String,
    pub invited_by: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = InnkeepError;

    fn try_from(row: InvitationRow) -> Result<Self> {
        let role = Role::from_str(&row.role).map_err(|e| {
            InnkeepError::validation(format!("Invalid invitation role '{}': {}", row.role, e))
        })?;

        Ok(Invitation {
            id: InvitationId::from_raw(row.id),
            org_id: OrgId::from_raw(row.org_id),
            email: row.email,
            role,
            token: row.token,
            invited_by: row.invited_by.map(UserId::from_raw),
            expires_at: row.expires_at,
            used_at: row.used_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Store an invitation row
    async fn create_invitation(&self, invitation: &Invitation) -> Result<()>;

    /// Fetch an invitation by its token, used or not
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>>;

    /// Stamp an invitation as used. Returns false when it was already used,
    /// which is how concurrent acceptances are decided.
    async fn mark_used(&self, id: &InvitationId, used_at: DateTime<Utc>) -> Result<bool>;

    /// List an organization's invitations, newest first
    async fn list_by_org(&self, org_id: &OrgId) -> Result<Vec<Invitation>>;

    /// Delete an unused invitation scoped to the org. Returns false when
    /// the invitation is unknown, foreign, or already used.
    async fn delete_unused(&self, org_id: &OrgId, id: &InvitationId) -> Result<bool>;
}

pub struct SqlxInvitationRepository {
    pool: DbPool,
}

impl SqlxInvitationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for SqlxInvitationRepository {
    #[instrument(skip(self, invitation), fields(invitation_id = %invitation.id, org_id = %invitation.org_id))]
    async fn create_invitation(&self, invitation: &Invitation) -> Result<()> {
        sqlx::query(
            "INSERT INTO invitations (
                id, org_id, email, role, token, invited_by, expires_at, used_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(invitation.id.as_str())
        .bind(invitation.org_id.as_str())
        .bind(&invitation.email)
        .bind(invitation.role.as_str())
        .bind(&invitation.token)
        .bind(invitation.invited_by.as_ref().map(|id| id.as_str()))
        .bind(invitation.expires_at)
        .bind(invitation.used_at)
        .bind(invitation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "create invitation"))?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>("SELECT * FROM invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, "fetch invitation by token"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), fields(invitation_id = %id))]
    async fn mark_used(&self, id: &InvitationId, used_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE invitations SET used_at = $1 WHERE id = $2 AND used_at IS NULL",
        )
        .bind(used_at)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "mark invitation used"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(org_id = %org_id))]
    async fn list_by_org(&self, org_id: &OrgId) -> Result<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, InvitationRow>(
            "SELECT * FROM invitations WHERE org_id = $1 ORDER BY created_at DESC",
        )
        .bind(org_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "list invitations"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self), fields(org_id = %org_id, invitation_id = %id))]
    async fn delete_unused(&self, org_id: &OrgId, id: &InvitationId) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM invitations WHERE id = $1 AND org_id = $2 AND used_at IS NULL",
        )
        .bind(id.as_str())
        .bind(org_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "delete invitation"))?;

        Ok(result.rows_affected() > 0)
    }
}
