//! Reservation repository.
//!
//! Reservations carry a denormalized org id alongside the property id so
//! tenant scoping never needs a join. The property id is fixed at creation
//! and cannot be moved by an update.

use crate::domain::{OrgId, PropertyId, ReservationId, UserId};
use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::instrument;
use utoipa::ToSchema;

/// A guest booking against a property.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub org_id: OrgId,
    pub property_id: PropertyId,
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub property_id: PropertyId,
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
}

/// Full-replace update payload. The property id is not part of it.
#[derive(Debug, Clone)]
pub struct UpdateReservation {
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct ReservationRow {
    pub id: String,
    pub org_id: String,
    pub property_id: String,
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: ReservationId::from_raw(row.id),
            org_id: OrgId::from_raw(row.org_id),
            property_id: PropertyId::from_raw(row.property_id),
            guest_name: row.guest_name,
            start_date: row.start_date,
            end_date: row.end_date,
            notes: row.notes,
            created_by: row.created_by.map(UserId::from_raw),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn create_reservation(&self, org_id: &OrgId, new: NewReservation) -> Result<Reservation>;
    async fn get_reservation(
        &self,
        org_id: &OrgId,
        id: &ReservationId,
    ) -> Result<Option<Reservation>>;
    /// List reservations for an org, optionally narrowed to one property.
    async fn list_reservations(
        &self,
        org_id: &OrgId,
        property_id: Option<&PropertyId>,
    ) -> Result<Vec<Reservation>>;
    /// Replace a reservation's mutable fields. `None` means the
    /// reservation is not in this org.
    async fn update_reservation(
        &self,
        org_id: &OrgId,
        id: &ReservationId,
        update: UpdateReservation,
    ) -> Result<Option<Reservation>>;
    /// Returns false when the reservation is not in this org.
    async fn delete_reservation(&self, org_id: &OrgId, id: &ReservationId) -> Result<bool>;
}

pub struct SqlxReservationRepository {
    pool: DbPool,
}

impl SqlxReservationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqlxReservationRepository {
    #[instrument(skip(self, new), fields(org_id = %org_id, property_id = %new.property_id))]
    async fn create_reservation(&self, org_id: &OrgId, new: NewReservation) -> Result<Reservation> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ReservationRow>(
            "INSERT INTO reservations (id, org_id, property_id, guest_name, start_date, end_date, notes, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *",
        )
        .bind(ReservationId::new().into_string())
        .bind(org_id.as_str())
        .bind(new.property_id.as_str())
        .bind(&new.guest_name)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.notes.as_deref())
        .bind(new.created_by.as_ref().map(|u| u.as_str().to_string()))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, "create reservation"))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(org_id = %org_id, reservation_id = %id))]
    async fn get_reservation(
        &self,
        org_id: &OrgId,
        id: &ReservationId,
    ) -> Result<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "SELECT * FROM reservations WHERE id = $1 AND org_id = $2",
        )
        .bind(id.as_str())
        .bind(org_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, format!("fetch reservation {}", id)))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(org_id = %org_id))]
    async fn list_reservations(
        &self,
        org_id: &OrgId,
        property_id: Option<&PropertyId>,
    ) -> Result<Vec<Reservation>> {
        let rows = match property_id {
            Some(property_id) => {
                sqlx::query_as::<_, ReservationRow>(
                    "SELECT * FROM reservations WHERE org_id = $1 AND property_id = $2 ORDER BY start_date, created_at",
                )
                .bind(org_id.as_str())
                .bind(property_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ReservationRow>(
                    "SELECT * FROM reservations WHERE org_id = $1 ORDER BY start_date, created_at",
                )
                .bind(org_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| InnkeepError::database(e, "list reservations"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, update), fields(org_id = %org_id, reservation_id = %id))]
    async fn update_reservation(
        &self,
        org_id: &OrgId,
        id: &ReservationId,
        update: UpdateReservation,
    ) -> Result<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "UPDATE reservations SET guest_name = $1, start_date = $2, end_date = $3, notes = $4, updated_at = $5
            WHERE id = $6 AND org_id = $7
            RETURNING *",
        )
        .bind(&update.guest_name)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.notes.as_deref())
        .bind(Utc::now())
        .bind(id.as_str())
        .bind(org_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| InnkeepError::database(e, format!("update reservation {}", id)))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(org_id = %org_id, reservation_id = %id))]
    async fn delete_reservation(&self, org_id: &OrgId, id: &ReservationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1 AND org_id = $2")
            .bind(id.as_str())
            .bind(org_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| InnkeepError::database(e, format!("delete reservation {}", id)))?;

        Ok(result.rows_affected() > 0)
    }
}
