//! Email/password login and organization selection.

use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::hashing;
use crate::auth::models::AuthError;
use crate::auth::organization::MembershipWithOrg;
use crate::auth::user::User;
use crate::domain::OrgId;
use crate::storage::repositories::{
    MembershipRepository, SqlxMembershipRepository, SqlxUserRepository, UserRepository,
};

/// Dummy hash verified when the email is unknown, so lookups for missing and
/// existing accounts cost the same Argon2 work and timing cannot enumerate
/// users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("placeholder-credential")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Login request payload.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Organization to open the session for. Defaults to the user's first
    /// organization by membership age.
    pub org_id: Option<OrgId>,
}

/// Organization selected for the new session.
#[derive(Debug, Clone)]
pub struct OrgSelection {
    pub org_id: OrgId,
    pub org_name: String,
    pub role: crate::auth::organization::Role,
}

/// Result of a successful credential check and org selection.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub org: OrgSelection,
}

/// Checks credentials and opens sessions.
#[derive(Clone)]
pub struct LoginService {
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl LoginService {
    pub fn new(users: Arc<dyn UserRepository>, memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { users, memberships }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool) -> Self {
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxMembershipRepository::new(pool)),
        )
    }

    /// Verify credentials and pick the organization for the session.
    ///
    /// All credential failures collapse into [`AuthError::InvalidCredentials`]
    /// so responses never reveal whether an email exists. Organization
    /// problems are only reported after the password has been verified.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        let email = User::normalize_email(&request.email);

        let with_hash = match self.users.find_by_email_with_hash(&email).await? {
            Some(found) => found,
            None => {
                // Burn the same Argon2 work as a real verification
                if let Err(e) = hashing::verify_password(&request.password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                warn!(email = %email, "login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let password_matches =
            hashing::verify_password(&request.password, &with_hash.password_hash)?;
        if !password_matches {
            warn!(user_id = %with_hash.user.id, "login attempt with incorrect password");
            return Err(AuthError::InvalidCredentials);
        }

        let user = with_hash.user;
        if !user.active {
            warn!(user_id = %user.id, "login attempt for deactivated account");
            return Err(AuthError::InvalidCredentials);
        }

        let memberships = self.memberships.list_memberships_for_user(&user.id).await?;
        let org = select_org(&memberships, request.org_id.as_ref())?;

        info!(user_id = %user.id, org_id = %org.org_id, "user logged in");
        Ok(LoginOutcome { user, org })
    }
}

/// Pick the session organization from the user's memberships.
///
/// With no explicit request the first organization wins, where "first" means
/// oldest membership. An explicit org the user does not belong to is refused
/// outright rather than silently falling back.
fn select_org(
    memberships: &[MembershipWithOrg],
    requested: Option<&OrgId>,
) -> Result<OrgSelection, AuthError> {
    if memberships.is_empty() {
        return Err(AuthError::NoOrganizationsAssigned);
    }

    let chosen = match requested {
        Some(org_id) => memberships
            .iter()
            .find(|m| &m.org_id == org_id)
            .ok_or(AuthError::OrganizationNotAllowed)?,
        None => &memberships[0],
    };

    Ok(OrgSelection {
        org_id: chosen.org_id.clone(),
        org_name: chosen.org_name.clone(),
        role: chosen.role,
    })
}
