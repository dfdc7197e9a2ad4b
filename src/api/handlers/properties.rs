//! Property endpoints, all scoped to the organization from the membership gate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::error::{ok, ok_empty, ApiError, ApiJson, Envelope};
use crate::api::routes::ApiState;
use crate::auth::OrgContext;
use crate::domain::PropertyId;
use crate::errors::InnkeepError;
use crate::storage::repositories::{NewProperty, Property, UpdateProperty};

/// Property payload, shared by create and full update.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBody {
    #[validate(length(min = 1, max = 200, message = "Property name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Address must be 1-500 characters"))]
    pub address: String,
    #[validate(length(max = 2000, message = "Description is limited to 2000 characters"))]
    pub description: Option<String>,
}

/// Path parameters for property-scoped routes.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PropertyPath {
    /// Organization ID
    pub org_id: String,
    /// Property ID
    pub property_id: String,
}

/// List properties
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}/properties",
    tag = "properties",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Properties in the organization", body = [Property])
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id))]
pub async fn list_properties_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
) -> Result<Json<Envelope<Vec<Property>>>, ApiError> {
    let properties = state.properties.list_properties(&context.org_id).await?;
    Ok(ok(properties))
}

/// Create a property
#[utoipa::path(
    post,
    path = "/api/v1/orgs/{org_id}/properties",
    tag = "properties",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    request_body = PropertyBody,
    responses(
        (status = 201, description = "Property created", body = Property),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin")
    )
)]
#[instrument(skip(state, payload), fields(org_id = %context.org_id))]
pub async fn create_property_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    ApiJson(payload): ApiJson<PropertyBody>,
) -> Result<(StatusCode, Json<Envelope<Property>>), ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;

    let property = state
        .properties
        .create_property(
            &context.org_id,
            NewProperty {
                name: payload.name,
                address: payload.address,
                description: payload.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, ok(property)))
}

/// Get a property
///
/// A property in another organization is indistinguishable from one that
/// does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}/properties/{property_id}",
    tag = "properties",
    params(PropertyPath),
    responses(
        (status = 200, description = "Property details", body = Property),
        (status = 404, description = "Property not found in this organization")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id, property_id = %path.property_id))]
pub async fn get_property_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<PropertyPath>,
) -> Result<Json<Envelope<Property>>, ApiError> {
    let property_id = PropertyId::from_raw(path.property_id);
    let property = state
        .properties
        .get_property(&context.org_id, &property_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("property not found: {}", property_id)))?;
    Ok(ok(property))
}

/// Replace a property
///
/// Full replacement: omitting `description` clears it.
#[utoipa::path(
    put,
    path = "/api/v1/orgs/{org_id}/properties/{property_id}",
    tag = "properties",
    params(PropertyPath),
    request_body = PropertyBody,
    responses(
        (status = 200, description = "Property updated", body = Property),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Property not found in this organization")
    )
)]
#[instrument(skip(state, payload), fields(org_id = %context.org_id, property_id = %path.property_id))]
pub async fn update_property_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<PropertyPath>,
    ApiJson(payload): ApiJson<PropertyBody>,
) -> Result<Json<Envelope<Property>>, ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;

    let property_id = PropertyId::from_raw(path.property_id);
    let property = state
        .properties
        .update_property(
            &context.org_id,
            &property_id,
            UpdateProperty {
                name: payload.name,
                address: payload.address,
                description: payload.description,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found(format!("property not found: {}", property_id)))?;
    Ok(ok(property))
}

/// Delete a property
///
/// Reservations under the property are deleted with it.
#[utoipa::path(
    delete,
    path = "/api/v1/orgs/{org_id}/properties/{property_id}",
    tag = "properties",
    params(PropertyPath),
    responses(
        (status = 200, description = "Property deleted"),
        (status = 403, description = "Caller is not an owner"),
        (status = 404, description = "Property not found in this organization")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id, property_id = %path.property_id))]
pub async fn delete_property_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<PropertyPath>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let property_id = PropertyId::from_raw(path.property_id);
    let deleted = state.properties.delete_property(&context.org_id, &property_id).await?;
    if !deleted {
        return Err(ApiError::not_found(format!("property not found: {}", property_id)));
    }
    Ok(ok_empty())
}
