//! Axum middleware for the three authorization gates.
//!
//! Every tenant request passes the gates in order: session, then membership,
//! then minimum role. Each gate re-checks its own facts on every request, so
//! revoking a membership takes effect immediately even for live sessions.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info_span, warn};

use crate::api::error::ApiError;
use crate::auth::models::{AuthError, OrgContext, SessionIdentity};
use crate::auth::organization::Role;
use crate::auth::session::{SessionService, SESSION_COOKIE_NAME};
use crate::domain::OrgId;
use crate::storage::repositories::MembershipRepository;

pub type SessionState = SessionService;
pub type MembershipState = Arc<dyn MembershipRepository>;

/// Session gate: resolves the session cookie into a [`SessionIdentity`] and
/// attaches it to the request.
pub async fn require_session(
    State(sessions): State<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!("auth.require_session", http.method = %method, http.path = %path);
    let _guard = span.enter();

    let jar = CookieJar::from_headers(request.headers());
    let token = match jar.get(SESSION_COOKIE_NAME) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            warn!(http.path = %path, "request without session cookie");
            return Err(map_auth_error(AuthError::NoSession));
        }
    };

    match sessions.resolve_session(&token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(http.path = %path, error = %err, "session resolution failed");
            Err(map_auth_error(err))
        }
    }
}

/// Membership gate: checks the path organization against the session and
/// loads the caller's roles in it, attaching an [`OrgContext`].
///
/// The session is pinned to one organization, so a cookie for org A can
/// never reach org B's routes even if the user belongs to both.
pub async fn resolve_membership(
    State(memberships): State<MembershipState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let identity = match request.extensions().get::<SessionIdentity>() {
        Some(identity) => identity.clone(),
        None => return Err(map_auth_error(AuthError::MissingContext)),
    };

    let path = request.uri().path().to_string();
    let org_id = match org_id_from_path(&path) {
        Some(raw) => OrgId::from_raw(raw),
        None => return Err(map_auth_error(AuthError::MissingOrgId)),
    };

    let span = info_span!(
        "auth.resolve_membership",
        http.path = %path,
        user_id = %identity.user_id,
        org_id = %org_id
    );
    let _guard = span.enter();

    if identity.org_id != org_id {
        warn!(
            session_org = %identity.org_id,
            path_org = %org_id,
            "session bound to a different organization"
        );
        return Err(map_auth_error(AuthError::WrongOrganization));
    }

    let roles = memberships
        .roles_for_user(&identity.user_id, &org_id)
        .await
        .map_err(|err| map_auth_error(err.into()))?;
    if roles.is_empty() {
        warn!(user_id = %identity.user_id, org_id = %org_id, "no membership in organization");
        return Err(map_auth_error(AuthError::NoMembership));
    }

    request.extensions_mut().insert(OrgContext::new(identity.user_id, org_id, roles));
    Ok(next.run(request).await)
}

/// Role gate: checks the caller's highest role against the minimum the
/// matched route requires.
pub async fn require_min_role(
    State(minimum): State<Role>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let context = match request.extensions().get::<OrgContext>() {
        Some(context) => context,
        None => return Err(map_auth_error(AuthError::MissingContext)),
    };

    if context.satisfies(minimum) {
        return Ok(next.run(request).await);
    }

    warn!(
        user_id = %context.user_id,
        org_id = %context.org_id,
        required = %minimum,
        granted = ?context.max_role(),
        "role check failed"
    );
    Err(map_auth_error(AuthError::InsufficientRole))
}

/// Extract the organization id segment from a tenant path.
///
/// ```
/// use innkeep::auth::middleware::org_id_from_path;
///
/// assert_eq!(org_id_from_path("/api/v1/orgs/org-1/properties"), Some("org-1"));
/// assert_eq!(org_id_from_path("/api/v1/orgs/org-1"), Some("org-1"));
/// assert_eq!(org_id_from_path("/api/v1/orgs"), None);
/// ```
pub fn org_id_from_path(path: &str) -> Option<&str> {
    // Expected pattern: /api/v1/orgs/{org_id} or /api/v1/orgs/{org_id}/...
    let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    if parts.len() >= 4 && parts[0] == "api" && parts[1] == "v1" && parts[2] == "orgs" {
        Some(parts[3]).filter(|segment| !segment.is_empty())
    } else {
        None
    }
}

fn map_auth_error(err: AuthError) -> ApiError {
    ApiError::from(err)
}
