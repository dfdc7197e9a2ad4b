//! Reservation endpoints. Property scoping is enforced through the owning
//! organization, so a reservation under another org's property 404s.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::error::{ok, ok_empty, ApiError, ApiJson, Envelope};
use crate::api::routes::ApiState;
use crate::auth::OrgContext;
use crate::domain::{PropertyId, ReservationId};
use crate::errors::InnkeepError;
use crate::storage::repositories::{NewReservation, Reservation, UpdateReservation};

/// Reservation creation payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationBody {
    pub property_id: String,
    #[validate(length(min = 1, max = 200, message = "Guest name must be 1-200 characters"))]
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: Option<String>,
}

/// Reservation update payload. The property binding is immutable; dates,
/// guest, and notes can change.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationBody {
    #[validate(length(min = 1, max = 200, message = "Guest name must be 1-200 characters"))]
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: Option<String>,
}

/// Query parameters for reservation listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReservationsQuery {
    /// Restrict the listing to one property
    pub property_id: Option<String>,
}

/// Path parameters for reservation-scoped routes.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationPath {
    /// Organization ID
    pub org_id: String,
    /// Reservation ID
    pub reservation_id: String,
}

/// A stay must span at least one night.
fn check_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ApiError> {
    if end_date <= start_date {
        return Err(ApiError::bad_request("endDate must be after startDate"));
    }
    Ok(())
}

/// List reservations
///
/// Returns the organization's reservations ordered by start date, optionally
/// restricted to one property.
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}/reservations",
    tag = "reservations",
    params(
        ("org_id" = String, Path, description = "Organization ID"),
        ListReservationsQuery
    ),
    responses(
        (status = 200, description = "Reservations in the organization", body = [Reservation])
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id))]
pub async fn list_reservations_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Envelope<Vec<Reservation>>>, ApiError> {
    let property_id = query.property_id.map(PropertyId::from_raw);
    let reservations =
        state.reservations.list_reservations(&context.org_id, property_id.as_ref()).await?;
    Ok(ok(reservations))
}

/// Create a reservation
///
/// Books a guest into one of the organization's properties. The property
/// must belong to this organization, otherwise the request 404s.
#[utoipa::path(
    post,
    path = "/api/v1/orgs/{org_id}/reservations",
    tag = "reservations",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    request_body = CreateReservationBody,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 400, description = "Invalid payload or date range"),
        (status = 404, description = "Property not found in this organization")
    )
)]
#[instrument(skip(state, payload), fields(org_id = %context.org_id))]
pub async fn create_reservation_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    ApiJson(payload): ApiJson<CreateReservationBody>,
) -> Result<(StatusCode, Json<Envelope<Reservation>>), ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;
    check_dates(payload.start_date, payload.end_date)?;

    let property_id = PropertyId::from_raw(payload.property_id);
    state
        .properties
        .get_property(&context.org_id, &property_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("property not found: {}", property_id)))?;

    let reservation = state
        .reservations
        .create_reservation(
            &context.org_id,
            NewReservation {
                property_id,
                guest_name: payload.guest_name,
                start_date: payload.start_date,
                end_date: payload.end_date,
                notes: payload.notes,
                created_by: Some(context.user_id.clone()),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, ok(reservation)))
}

/// Get a reservation
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}/reservations/{reservation_id}",
    tag = "reservations",
    params(ReservationPath),
    responses(
        (status = 200, description = "Reservation details", body = Reservation),
        (status = 404, description = "Reservation not found in this organization")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id, reservation_id = %path.reservation_id))]
pub async fn get_reservation_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<ReservationPath>,
) -> Result<Json<Envelope<Reservation>>, ApiError> {
    let reservation_id = ReservationId::from_raw(path.reservation_id);
    let reservation = state
        .reservations
        .get_reservation(&context.org_id, &reservation_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("reservation not found: {}", reservation_id)))?;
    Ok(ok(reservation))
}

/// Update a reservation
///
/// Replaces guest, dates, and notes. The reservation stays on its property.
#[utoipa::path(
    put,
    path = "/api/v1/orgs/{org_id}/reservations/{reservation_id}",
    tag = "reservations",
    params(ReservationPath),
    request_body = UpdateReservationBody,
    responses(
        (status = 200, description = "Reservation updated", body = Reservation),
        (status = 400, description = "Invalid payload or date range"),
        (status = 404, description = "Reservation not found in this organization")
    )
)]
#[instrument(skip(state, payload), fields(org_id = %context.org_id, reservation_id = %path.reservation_id))]
pub async fn update_reservation_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<ReservationPath>,
    ApiJson(payload): ApiJson<UpdateReservationBody>,
) -> Result<Json<Envelope<Reservation>>, ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;
    check_dates(payload.start_date, payload.end_date)?;

    let reservation_id = ReservationId::from_raw(path.reservation_id);
    let reservation = state
        .reservations
        .update_reservation(
            &context.org_id,
            &reservation_id,
            UpdateReservation {
                guest_name: payload.guest_name,
                start_date: payload.start_date,
                end_date: payload.end_date,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found(format!("reservation not found: {}", reservation_id)))?;
    Ok(ok(reservation))
}

/// Delete a reservation
#[utoipa::path(
    delete,
    path = "/api/v1/orgs/{org_id}/reservations/{reservation_id}",
    tag = "reservations",
    params(ReservationPath),
    responses(
        (status = 200, description = "Reservation deleted"),
        (status = 403, description = "Caller is not an owner"),
        (status = 404, description = "Reservation not found in this organization")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id, reservation_id = %path.reservation_id))]
pub async fn delete_reservation_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<ReservationPath>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let reservation_id = ReservationId::from_raw(path.reservation_id);
    let deleted = state.reservations.delete_reservation(&context.org_id, &reservation_id).await?;
    if !deleted {
        return Err(ApiError::not_found(format!("reservation not found: {}", reservation_id)));
    }
    Ok(ok_empty())
}
