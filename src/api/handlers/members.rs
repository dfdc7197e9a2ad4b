//! Membership endpoints: listing, role changes, and removal.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ok, ok_empty, ApiError, ApiJson, Envelope};
use crate::api::routes::ApiState;
use crate::auth::{MemberRecord, OrgContext, Role};
use crate::domain::UserId;

/// Path parameters for member-scoped routes.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MemberPath {
    /// Organization ID
    pub org_id: String,
    /// User ID of the member
    pub user_id: String,
}

/// Role change payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberBody {
    pub role: Role,
}

/// Result of a role change.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedMember {
    pub user_id: UserId,
    pub role: Role,
}

/// List members
///
/// Returns every member of the organization with email, name, role, and
/// join date, oldest membership first.
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org_id}/members",
    tag = "members",
    params(
        ("org_id" = String, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Members of the organization", body = [MemberRecord])
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id))]
pub async fn list_members_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
) -> Result<Json<Envelope<Vec<MemberRecord>>>, ApiError> {
    let members = state.memberships.list_members(&context.org_id).await?;
    Ok(ok(members))
}

/// Change a member's role
///
/// Replaces the member's role in this organization. There is no guard
/// against demoting the last owner; owners are trusted with the footgun.
#[utoipa::path(
    patch,
    path = "/api/v1/orgs/{org_id}/members/{user_id}",
    tag = "members",
    params(MemberPath),
    request_body = UpdateMemberBody,
    responses(
        (status = 200, description = "Role updated", body = UpdatedMember),
        (status = 403, description = "Caller is not an owner"),
        (status = 404, description = "No membership for that user")
    )
)]
#[instrument(skip(state, payload), fields(org_id = %context.org_id, user_id = %path.user_id))]
pub async fn update_member_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<MemberPath>,
    ApiJson(payload): ApiJson<UpdateMemberBody>,
) -> Result<Json<Envelope<UpdatedMember>>, ApiError> {
    let user_id = UserId::from_raw(path.user_id);
    let updated = state.memberships.update_role(&context.org_id, &user_id, payload.role).await?;
    if !updated {
        return Err(ApiError::not_found(format!("membership not found: {}", user_id)));
    }
    Ok(ok(UpdatedMember { user_id, role: payload.role }))
}

/// Remove a member
///
/// Deletes the user's membership in this organization. Their sessions bound
/// to this organization fail the membership gate from the next request on.
#[utoipa::path(
    delete,
    path = "/api/v1/orgs/{org_id}/members/{user_id}",
    tag = "members",
    params(MemberPath),
    responses(
        (status = 200, description = "Membership removed"),
        (status = 403, description = "Caller is not an owner"),
        (status = 404, description = "No membership for that user")
    )
)]
#[instrument(skip(state), fields(org_id = %context.org_id, user_id = %path.user_id))]
pub async fn remove_member_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<OrgContext>,
    Path(path): Path<MemberPath>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let user_id = UserId::from_raw(path.user_id);
    let removed = state.memberships.remove_member(&context.org_id, &user_id).await?;
    if !removed {
        return Err(ApiError::not_found(format!("membership not found: {}", user_id)));
    }
    Ok(ok_empty())
}
