//! Request-scoped authentication models and the auth error taxonomy.

use thiserror::Error;

use crate::auth::organization::{max_role, Role};
use crate::domain::{OrgId, UserId};
use crate::errors::InnkeepError;

/// Identity established by the session gate and attached to the request.
///
/// Carries only what the session proves: who the user is and which
/// organization the session was opened for. Membership is verified
/// separately, so a stale session cannot smuggle org access past a
/// membership that has since been revoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub org_id: OrgId,
}

/// Tenant context established by the membership gate.
///
/// Holds every role the user has in the organization. Role checks take the
/// maximum, so duplicate membership rows can only widen access, never
/// flicker it.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub user_id: UserId,
    pub org_id: OrgId,
    roles: Vec<Role>,
}

impl OrgContext {
    pub fn new(user_id: UserId, org_id: OrgId, roles: Vec<Role>) -> Self {
        Self { user_id, org_id, roles }
    }

    /// Highest role held in this organization. `None` means no membership,
    /// which the membership gate rejects before this context exists.
    pub fn max_role(&self) -> Option<Role> {
        max_role(&self.roles)
    }

    pub fn satisfies(&self, minimum: Role) -> bool {
        self.max_role().is_some_and(|role| role.satisfies(minimum))
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

/// Errors returned by the authentication and authorization pipeline.
///
/// Display strings double as the client-facing error messages, so they are
/// stable API surface.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session")]
    NoSession,
    #[error("Session expired")]
    SessionExpired,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No organizations assigned")]
    NoOrganizationsAssigned,
    #[error("Organization not allowed")]
    OrganizationNotAllowed,
    #[error("Wrong organization context")]
    WrongOrganization,
    #[error("No membership")]
    NoMembership,
    #[error("Insufficient role")]
    InsufficientRole,
    #[error("Invalid or expired invite")]
    InvalidInvitation,
    #[error("Missing authentication context")]
    MissingContext,
    #[error("Missing organization id")]
    MissingOrgId,
    #[error(transparent)]
    Persistence(#[from] InnkeepError),
}
