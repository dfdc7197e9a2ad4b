//! Property repository.
//!
//! Every operation is scoped by organization id in the WHERE clause, so a
//! property in another org is indistinguishable from one that does not
//! exist.

use crate::domain::{OrgId, PropertyId};
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::instrument;
use utoipa::ToSchema;

/// A rentable unit belonging to an organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub org_id: OrgId,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a property.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
}

/// Full-replace update payload for a property.
#[derive(Debug, Clone)]
pub struct UpdateProperty {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct PropertyRow {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: PropertyId::from_raw(row.id),
            org_id: OrgId::from_raw(row.org_id),
            name: row.name,
            address: row.address,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create_property(&self, org_id: &OrgId, new: NewProperty) -> Result<Property>;
    async fn get_property(&self, org_id: &OrgId, id: &PropertyId) -> Result<Option<Property>>;
    async fn list_properties(&self, org_id: &OrgId) -> Result<Vec<Property>>;
    /// Replace a property's fields. `None` means the property is not in
    /// this org.
    async fn update_property(
        &self,
        org_id: &OrgId,
        id: &PropertyId,
        update: UpdateProperty,
    ) -> Result<Option<Property>>;
    /// Returns false when the property is not in this org.
    async fn delete_property(&self, org_id: &OrgId, id: &PropertyId) -> Result<bool>;
}

pub struct SqlxPropertyRepository {
    pool: DbPool,
}

impl SqlxPropertyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for SqlxPropertyRepository {
    #[instrument(skip(self, new), fields(org_id = %org_id, name = %new.name))]
    async fn create_property(&self, org_id: &OrgId, new: NewProperty) -> Result<Property> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, PropertyRow>(
            "INSERT INTO properties (id, org_id, name, address, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *",
        )
        .bind(PropertyId::new().into_string())
        .bind(org_id.as_str())
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.description.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "create property"))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(org_id = %org_id, property_id = %id))]
    async fn get_property(&self, org_id: &OrgId, id: &PropertyId) -> Result<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(
            "SELECT * FROM properties WHERE id = $1 AND org_id = $2",
        )
        .bind(id.as_str())
        .bind(org_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, format!("fetch property {}", id)))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(org_id = %org_id))]
    async fn list_properties(&self, org_id: &OrgId) -> Result<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>(
            "SELECT * FROM properties WHERE org_id = $1 ORDER BY created_at",
        )
        .bind(org_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "list properties"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, update), fields(org_id = %org_id, property_id = %id))]
    async fn update_property(
        &self,
        org_id: &OrgId,
        id: &PropertyId,
        update: UpdateProperty,
    ) -> Result<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(
            "UPDATE properties SET name = $1, address = $2, description = $3, updated_at = $4
            WHERE id = $5 AND org_id = $6
            RETURNING *",
        )
        .bind(&update.name)
        .bind(&update.address)
        .bind(update.description.as_deref())
        .bind(Utc::now())
        .bind(id.as_str())
        .bind(org_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, format!("update property {}", id)))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(org_id = %org_id, property_id = %id))]
    async fn delete_property(&self, org_id: &OrgId, id: &PropertyId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1 AND org_id = $2")
            .bind(id.as_str())
            .bind(org_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, format!("delete property {}", id)))?;

        Ok(result.rows_affected() > 0)
    }
}
