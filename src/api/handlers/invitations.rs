//! Invitation endpoints for invite-only onboarding.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::error::{ok, ok_empty, ApiError, ApiJson, Envelope};
use crate::api::routes::ApiState;
use crate::auth::{Invitation, OrgContext, Role};
use crate::domain::InvitationId;
use crate::errors::InnkeepError;

/// Invitation creation payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationBody {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub role: Role,
}

/// Freshly created invitation with its plaintext token.
///
/// The token appears only here. Listings serialize the same record without
/// it, so this response is the single chance to copy the invite link.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvitationCreatedBody {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub token: String,
}

/// Path parameters for invitation-scoped routes.
#[derive(Debug, Deserialize, IntoParams)]
pub struct InvitationPath {
    /// Organization ID
    pub org_id: String,
    /// Invitation ID
    pub invitation_id: String,
}

/// Create an invitation
///
/// Invites an email address into the organization with the given role. The
/// granted role may not exceed the caller's own highest role.
#[utoipa::path(
    post,
    path = "/api/v1/orgs/{org_id}/invitations",
    tag = "invitations",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    request_body = CreateInvitationBody,
    responses(
        (status = 201, description = "Invitation created", body = InvitationCreatedBody),
        (status = 400, description = "Invalid email or role"),
        (status = 403, description = "Caller may not grant a role above their own")
    )
)]
#[instrument(skip(state, payload), fields(org_id = %context.org_id))]
pub async fn create_invitation_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    ApiJson(payload): ApiJson<CreateInvitationBody>,
) -> Result<(StatusCode, Json<Envelope<InvitationCreatedBody>>), ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;

    let invitation =
        state.invitations.create_invitation(&context, &payload.email, payload.role).await?;
    let token = invitation.token.clone();
    Ok((StatusCode::CREATED, ok(InvitationCreatedBody { invitation, token })))
}

/// List invitations
///
/// Returns every invitation for the organization, newest first. Tokens are
/// never echoed here.
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}/invitations",
    tag = "invitations",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Invitations for the organization", body = [Invitation])
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id))]
pub async fn list_invitations_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
) -> Result<Json<Envelope<Vec<Invitation>>>, ApiError> {
    let invitations = state.invitations.list_invitations(&context.org_id).await?;
    Ok(ok(invitations))
}

/// Revoke an invitation
///
/// Deletes an unused invitation. Used invitations are part of the audit
/// trail and cannot be revoked; they 404 like absent ones.
#[utoipa::path(
    delete,
    path = "/api/v1/orgs/{org_id}/invitations/{invitation_id}",
    tag = "invitations",
    params(InvitationPath),
    responses(
        (status = 200, description = "Invitation revoked"),
        (status = 404, description = "Invitation absent or already used")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id, invitation_id = %path.invitation_id))]
pub async fn revoke_invitation_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<InvitationPath>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let invitation_id = InvitationId::from_raw(path.invitation_id);
    state.invitations.revoke_invitation(&context.org_id, &invitation_id).await?;
    Ok(ok_empty())
}
