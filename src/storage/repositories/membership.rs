//! Membership repository.
//!
//! Memberships tie users to organizations with a role. The (user, org) pair
//! is unique at the schema level; reads still tolerate duplicates by
//! returning every role and letting callers take the maximum.

use crate::auth::organization::{MemberRecord, MembershipWithOrg, Role};
use crate::domain::{MembershipId, OrgId, UserId};
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

fn parse_role(raw: &str) -> Result<Role> {
    Role::from_str(raw)
        .map_err(|e| InnkeepError::validation(format!("Invalid membership role '{}': {}", raw, e)))
}

/// Row for member listings, joined with users.
#[derive(Debug, Clone, FromRow)]
struct MemberRow {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for MemberRecord {
    type Error = InnkeepError;

    fn try_from(row: MemberRow) -> Result<Self> {
        Ok(MemberRecord {
            user_id: UserId::from_raw(row.user_id),
            email: row.email,
            name: row.name,
            role: parse_role(&row.role)?,
            joined_at: row.joined_at,
        })
    }
}

/// Row for membership queries joined with organizations.
#[derive(Debug, Clone, FromRow)]
struct MembershipWithOrgRow {
    pub org_id: String,
    pub org_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MembershipWithOrgRow> for MembershipWithOrg {
    type Error = InnkeepError;

    fn try_from(row: MembershipWithOrgRow) -> Result<Self> {
        Ok(MembershipWithOrg {
            org_id: OrgId::from_raw(row.org_id),
            org_name: row.org_name,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Create a membership if none exists for (user, org). An existing row
    /// keeps its role.
    async fn ensure_membership(&self, user_id: &UserId, org_id: &OrgId, role: Role) -> Result<()>;

    /// All roles the user holds in the organization. Empty means no
    /// membership.
    async fn roles_for_user(&self, user_id: &UserId, org_id: &OrgId) -> Result<Vec<Role>>;

    /// List an organization's members with user details, oldest first.
    async fn list_members(&self, org_id: &OrgId) -> Result<Vec<MemberRecord>>;

    /// List a user's memberships with org details, oldest first. The first
    /// entry is the login default.
    async fn list_memberships_for_user(&self, user_id: &UserId) -> Result<Vec<MembershipWithOrg>>;

    /// Change a member's role. Returns false when no membership exists.
    async fn update_role(&self, org_id: &OrgId, user_id: &UserId, role: Role) -> Result<bool>;

    /// Remove a member. Returns false when no membership exists.
    async fn remove_member(&self, org_id: &OrgId, user_id: &UserId) -> Result<bool>;
}

pub struct SqlxMembershipRepository {
    pool: DbPool,
}

impl SqlxMembershipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for SqlxMembershipRepository {
    #[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id, role = %role))]
    async fn ensure_membership(&self, user_id: &UserId, org_id: &OrgId, role: Role) -> Result<()> {
        sqlx::query(
            "INSERT INTO memberships (id, user_id, org_id, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id, org_id) DO NOTHING",
        )
        .bind(MembershipId::new().into_string())
        .bind(user_id.as_str())
        .bind(org_id.as_str())
        .bind(role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "ensure membership"))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
    async fn roles_for_user(&self, user_id: &UserId, org_id: &OrgId) -> Result<Vec<Role>> {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT role FROM memberships WHERE user_id = $1 AND org_id = $2",
        )
        .bind(user_id.as_str())
        .bind(org_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "fetch membership roles"))?;

        raw.iter().map(|r| parse_role(r)).collect()
    }

    #[instrument(skip(self), fields(org_id = %org_id))]
    async fn list_members(&self, org_id: &OrgId) -> Result<Vec<MemberRecord>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT m.user_id, u.email, u.name, m.role, m.created_at AS joined_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.org_id = $1
            ORDER BY m.created_at",
        )
        .bind(org_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "list members"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_memberships_for_user(&self, user_id: &UserId) -> Result<Vec<MembershipWithOrg>> {
        let rows = sqlx::query_as::<_, MembershipWithOrgRow>(
            "SELECT m.org_id, o.name AS org_name, m.role, m.created_at
            FROM memberships m
            JOIN organizations o ON o.id = m.org_id
            WHERE m.user_id = $1
            ORDER BY m.created_at",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "list user memberships"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self), fields(org_id = %org_id, user_id = %user_id, role = %role))]
    async fn update_role(&self, org_id: &OrgId, user_id: &UserId, role: Role) -> Result<bool> {
        let result =
            sqlx::query("UPDATE memberships SET role = $1 WHERE org_id = $2 AND user_id = $3")
                .bind(role.as_str())
                .bind(org_id.as_str())
                .bind(user_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| InnkeepError::database(e, "update membership role"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(org_id = %org_id, user_id = %user_id))]
    async fn remove_member(&self, org_id: &OrgId, user_id: &UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM memberships WHERE org_id = $1 AND user_id = $2")
            .bind(org_id.as_str())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, "remove member"))?;

        Ok(result.rows_affected() > 0)
    }
}
