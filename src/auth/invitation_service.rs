//! Invitation service for invite-based onboarding.
//!
//! Invitations carry an opaque single-use token scoped to one organization
//! and role. Accepting one provisions the account if needed and attaches the
//! membership; the token is burned atomically so double acceptance loses.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use tracing::{info, instrument, warn};

use crate::auth::hashing;
use crate::auth::invitation::Invitation;
use crate::auth::models::{AuthError, OrgContext};
use crate::auth::organization::{max_role, Role};
use crate::auth::user::User;
use crate::domain::{InvitationId, OrgId, UserId};
use crate::errors::{InnkeepError, Result};
use crate::storage::repositories::{
    InvitationRepository, MembershipRepository, SqlxInvitationRepository,
    SqlxMembershipRepository, SqlxUserRepository, UserRepository,
};

/// Number of random bytes for an invite token (32 bytes = 256 bits entropy).
const INVITE_TOKEN_BYTES: usize = 32;

/// Result of accepting an invitation.
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    pub user: User,
    pub org_id: OrgId,
    pub role: Role,
}

/// Service for creating, listing, revoking, and accepting invitations.
#[derive(Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
    ttl: Duration,
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        users: Arc<dyn UserRepository>,
        memberships: Arc<dyn MembershipRepository>,
        ttl: Duration,
    ) -> Self {
        Self { invitations, users, memberships, ttl }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, ttl: Duration) -> Self {
        Self::new(
            Arc::new(SqlxInvitationRepository::new(pool.clone())),
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxMembershipRepository::new(pool)),
            ttl,
        )
    }

    /// Create an invitation into the inviter's organization.
    ///
    /// The invited role may not exceed the inviter's own highest role, so an
    /// admin cannot mint owners.
    #[instrument(skip(self, inviter), fields(org_id = %inviter.org_id, role = %role))]
    pub async fn create_invitation(
        &self,
        inviter: &OrgContext,
        email: &str,
        role: Role,
    ) -> std::result::Result<Invitation, AuthError> {
        if !inviter.satisfies(role) {
            warn!(
                inviter = %inviter.user_id,
                requested = %role,
                granted = ?inviter.max_role(),
                "invitation role exceeds inviter's role"
            );
            return Err(AuthError::InsufficientRole);
        }

        let email = User::normalize_email(email);
        let now = Utc::now();
        let invitation = Invitation {
            id: InvitationId::new(),
            org_id: inviter.org_id.clone(),
            email,
            role,
            token: generate_invite_token(),
            invited_by: Some(inviter.user_id.clone()),
            expires_at: now + self.ttl,
            used_at: None,
            created_at: now,
        };
        self.invitations.create_invitation(&invitation).await?;

        info!(
            invitation_id = %invitation.id,
            org_id = %invitation.org_id,
            role = %invitation.role,
            "invitation issued"
        );
        Ok(invitation)
    }

    /// Accept an invitation, provisioning the account when necessary.
    ///
    /// Known emails get their password replaced and the account reactivated;
    /// unknown emails get a fresh account. The membership upsert keeps an
    /// existing row untouched, so the echoed role is re-read from storage
    /// rather than taken from the invitation.
    #[instrument(skip_all)]
    pub async fn accept_invitation(
        &self,
        token: &str,
        name: Option<&str>,
        password: &str,
    ) -> std::result::Result<AcceptOutcome, AuthError> {
        let invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or(AuthError::InvalidInvitation)?;

        if !invitation.is_acceptable(Utc::now()) {
            warn!(
                invitation_id = %invitation.id,
                used = invitation.is_used(),
                "attempt to accept a spent or expired invitation"
            );
            return Err(AuthError::InvalidInvitation);
        }

        let password_hash = hashing::hash_password(password)?;
        let user =
            self.users.upsert_by_email(&invitation.email, name, &password_hash).await?;

        self.memberships
            .ensure_membership(&user.id, &invitation.org_id, invitation.role)
            .await?;

        // Burn the token last; losing this race means someone else already
        // accepted and the whole attempt is rejected.
        let burned = self.invitations.mark_used(&invitation.id, Utc::now()).await?;
        if !burned {
            return Err(AuthError::InvalidInvitation);
        }

        let role = self.effective_role(&user.id, &invitation.org_id).await?;

        info!(
            user_id = %user.id,
            org_id = %invitation.org_id,
            role = %role,
            "invitation accepted"
        );
        Ok(AcceptOutcome { user, org_id: invitation.org_id, role })
    }

    /// List an organization's invitations, newest first.
    pub async fn list_invitations(&self, org_id: &OrgId) -> Result<Vec<Invitation>> {
        self.invitations.list_by_org(org_id).await
    }

    /// Revoke an unused invitation. Used or unknown invitations report as
    /// not found, matching what the caller can observe.
    #[instrument(skip(self), fields(org_id = %org_id, invitation_id = %invitation_id))]
    pub async fn revoke_invitation(
        &self,
        org_id: &OrgId,
        invitation_id: &InvitationId,
    ) -> Result<()> {
        let deleted = self.invitations.delete_unused(org_id, invitation_id).await?;
        if !deleted {
            return Err(InnkeepError::not_found("invitation", invitation_id.as_str()));
        }
        info!(invitation_id = %invitation_id, "invitation revoked");
        Ok(())
    }

    async fn effective_role(
        &self,
        user_id: &UserId,
        org_id: &OrgId,
    ) -> std::result::Result<Role, AuthError> {
        let roles = self.memberships.roles_for_user(user_id, org_id).await?;
        max_role(&roles).ok_or(AuthError::NoMembership)
    }
}

/// Generate a cryptographically secure invite token.
fn generate_invite_token() -> String {
    let mut bytes = [0u8; INVITE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
