//! Invitation domain models for invite-based registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::organization::Role;
use crate::domain::{InvitationId, OrgId, UserId};

/// Stored invitation record.
///
/// The token column holds the plaintext invite token. It is returned exactly
/// once, to the admin who created the invitation; listings never echo it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: InvitationId,
    pub org_id: OrgId,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
    pub invited_by: Option<UserId>,
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub used_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// An invitation can be accepted only while unused and unexpired.
    pub fn is_acceptable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired(now)
    }
}
