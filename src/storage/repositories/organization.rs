//! Organization repository.

use crate::auth::organization::Organization;
use crate::domain::{MembershipId, OrgId, UserId};
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: OrgId::from_raw(row.id),
            name: row.name,
            created_by: UserId::from_raw(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Create an organization and its creator's owner membership in one
    /// transaction. An org can never exist without an owner.
    async fn create_organization(&self, name: &str, created_by: &UserId) -> Result<Organization>;

    /// Look up an organization by id.
    async fn get_organization(&self, id: &OrgId) -> Result<Option<Organization>>;
}

pub struct SqlxOrganizationRepository {
    pool: DbPool,
}

impl SqlxOrganizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationRepository for SqlxOrganizationRepository {
    #[instrument(skip(self), fields(org_name = %name, created_by = %created_by))]
    async fn create_organization(&self, name: &str, created_by: &UserId) -> Result<Organization> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| InnkeepError::database(e, "begin organization transaction"))?;

        let now = Utc::now();
        let row = sqlx::query_as::<_, OrganizationRow>(
            "INSERT INTO organizations (id, name, created_by, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *",
        )
        .bind(OrgId::new().into_string())
        .bind(name)
        .bind(created_by.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| InnkeepError::database(e, "create organization"))?;

        sqlx::query(
            "INSERT INTO memberships (id, user_id, org_id, role, created_at)
            VALUES ($1, $2, $3, 'owner', $4)",
        )
        .bind(MembershipId::new().into_string())
        .bind(created_by.as_str())
        .bind(&row.id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| InnkeepError::database(e, "create owner membership"))?;

        tx.commit().await.map_err(|e| InnkeepError::database(e, "commit organization create"))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(org_id = %id))]
    async fn get_organization(&self, id: &OrgId) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, format!("fetch organization {}", id)))?;

        Ok(row.map(Into::into))
    }
}
