//! Organization endpoints: creation and tenant-scoped lookup.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::{ok, ApiError, ApiJson, Envelope};
use crate::api::routes::ApiState;
use crate::auth::{OrgContext, Organization, SessionIdentity};
use crate::errors::InnkeepError;

/// Organization creation payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationBody {
    #[validate(length(min = 1, max = 200, message = "Organization name must be 1-200 characters"))]
    pub name: String,
}

/// Create an organization
///
/// The caller becomes the creator and sole owner. The current session stays
/// bound to whatever organization it was opened for; switching requires a
/// fresh login.
#[utoipa::path(
    post,
    path = "/api/v1/orgs",
    tag = "organizations",
    request_body = CreateOrganizationBody,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Invalid name"),
        (status = 401, description = "No valid session")
    )
)]
#[instrument(skip(state, payload), fields(user_id = %identity.user_id))]
pub async fn create_organization_handler(
    State(state): State<ApiState>,
    Extension(identity): Extension<SessionIdentity>,
    ApiJson(payload): ApiJson<CreateOrganizationBody>,
) -> Result<(StatusCode, Json<Envelope<Organization>>), ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;

    let org = state.orgs.create_organization(payload.name.trim(), &identity.user_id).await?;
    Ok((StatusCode::CREATED, ok(org)))
}

/// Get the current organization
///
/// Returns the organization named in the path, which the membership gate has
/// already proven to match the session binding.
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}",
    tag = "organizations",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization details", body = Organization),
        (status = 403, description = "Session bound to a different organization"),
        (status = 404, description = "Organization not found")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id))]
pub async fn get_organization_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
) -> Result<Json<Envelope<Organization>>, ApiError> {
    let org = state
        .orgs
        .get_organization(&context.org_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("organization not found: {}", context.org_id)))?;
    Ok(ok(org))
}
