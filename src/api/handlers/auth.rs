//! Session endpoints: login, logout, current identity, invitation acceptance.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::{ok, ok_empty, ApiError, ApiJson, Envelope};
use crate::api::routes::ApiState;
use crate::auth::session::{build_session_cookie, clear_session_cookie};
use crate::auth::{LoginRequest, OrgSelection, Role, SessionIdentity, User, SESSION_COOKIE_NAME};
use crate::domain::OrgId;
use crate::errors::InnkeepError;

/// Organization half of a login or acceptance response: the org the new
/// session is bound to and the role that resolved the binding.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionOrg {
    pub org_id: OrgId,
    pub org_name: String,
    pub role: Role,
}

impl From<OrgSelection> for SessionOrg {
    fn from(selection: OrgSelection) -> Self {
        Self { org_id: selection.org_id, org_name: selection.org_name, role: selection.role }
    }
}

/// Body returned whenever a new session is opened.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponseBody {
    pub user: User,
    pub org: SessionOrg,
}

/// Response that carries both the session body and the session cookie.
pub struct SessionResponse {
    status: StatusCode,
    body: Envelope<SessionResponseBody>,
    cookie: Cookie<'static>,
}

impl SessionResponse {
    fn new(status: StatusCode, body: SessionResponseBody, cookie: Cookie<'static>) -> Self {
        Self { status, body: Envelope::ok(body), cookie }
    }
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Ok(cookie_value) = self.cookie.to_string().parse() {
            response.headers_mut().insert(header::SET_COOKIE, cookie_value);
        }
        response
    }
}

/// Log in with email and password
///
/// Verifies credentials, resolves the organization the session will be bound
/// to, and sets the session cookie. When `orgId` is omitted the oldest
/// membership wins.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = SessionResponseBody),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "No usable organization for this user")
    )
)]
#[instrument(skip(state, payload))]
pub async fn login_handler(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<SessionResponse, ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;

    let outcome = state.logins.login(&payload).await?;
    let session = state.sessions.create_session(&outcome.user.id, &outcome.org.org_id).await?;
    let cookie =
        build_session_cookie(&session.token, session.expires_at, state.auth.cookie_secure);

    Ok(SessionResponse::new(
        StatusCode::OK,
        SessionResponseBody { user: outcome.user, org: SessionOrg::from(outcome.org) },
        cookie,
    ))
}

/// Log out
///
/// Destroys the session row if the cookie names one, then expires the cookie.
/// Always succeeds, with or without a live session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cleared")
    )
)]
#[instrument(skip(state, jar))]
pub async fn logout_handler(
    State(state): State<ApiState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        state.sessions.destroy_session(cookie.value()).await?;
    }

    let mut response = ok_empty().into_response();
    if let Ok(cookie_value) = clear_session_cookie().to_string().parse() {
        response.headers_mut().insert(header::SET_COOKIE, cookie_value);
    }
    Ok(response)
}

/// Organization summary for the current identity, with every role held.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeOrg {
    pub org_id: OrgId,
    pub org_name: String,
    pub roles: Vec<Role>,
}

/// Current user plus the organization the session is bound to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponseBody {
    pub user: User,
    pub org: MeOrg,
}

/// Who am I
///
/// Returns the authenticated user and the organization the session is bound
/// to. Requires only a valid session, not a membership check, so the roles
/// list is empty if the membership was revoked after login.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current identity", body = MeResponseBody),
        (status = 401, description = "No valid session")
    )
)]
#[instrument(skip(state), fields(user_id = %identity.user_id))]
pub async fn me_handler(
    State(state): State<ApiState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<Json<Envelope<MeResponseBody>>, ApiError> {
    let user = state
        .users
        .find_by_id(&identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user not found: {}", identity.user_id)))?;
    let org = state
        .orgs
        .get_organization(&identity.org_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("organization not found: {}", identity.org_id))
        })?;
    let roles = state.memberships.roles_for_user(&identity.user_id, &identity.org_id).await?;

    Ok(ok(MeResponseBody { user, org: MeOrg { org_id: org.id, org_name: org.name, roles } }))
}

/// Invitation acceptance payload.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 16, message = "Invite token is too short"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}

/// Accept an invitation
///
/// Redeems an invite token, creating or updating the invited user, granting
/// the membership, and opening a session bound to the inviting organization.
#[utoipa::path(
    post,
    path = "/api/v1/auth/invitations/accept",
    tag = "auth",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 201, description = "Invitation accepted, session created", body = SessionResponseBody),
        (status = 400, description = "Invalid, used, or expired invitation")
    )
)]
#[instrument(skip(state, payload))]
pub async fn accept_invitation_handler(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<AcceptInvitationRequest>,
) -> Result<SessionResponse, ApiError> {
    payload.validate().map_err(|err| ApiError::from(InnkeepError::from(err)))?;

    let outcome = state
        .invitations
        .accept_invitation(&payload.token, payload.name.as_deref(), &payload.password)
        .await?;
    let org = state.orgs.get_organization(&outcome.org_id).await?.ok_or_else(|| {
        ApiError::internal(format!("organization {} missing for accepted invitation", outcome.org_id))
    })?;
    let session = state.sessions.create_session(&outcome.user.id, &outcome.org_id).await?;
    let cookie =
        build_session_cookie(&session.token, session.expires_at, state.auth.cookie_secure);

    Ok(SessionResponse::new(
        StatusCode::CREATED,
        SessionResponseBody {
            user: outcome.user,
            org: SessionOrg { org_id: org.id, org_name: org.name, role: outcome.role },
        },
        cookie,
    ))
}
