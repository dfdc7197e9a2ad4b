//! Organization and membership domain models.
//!
//! Organizations are the tenancy boundary: every property, reservation, and
//! invitation belongs to exactly one organization, and a user only reaches
//! those rows through a membership in that organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{MembershipId, OrgId, UserId};

/// What a member may do inside an organization.
///
/// Roles form a strict ladder: `Member < Admin < Owner`. Authorization checks
/// compare ranks, so a higher role always satisfies a lower requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standard member: can read org data and manage reservations
    Member,
    /// Can manage properties and invitations
    Admin,
    /// Full control, including membership changes and deletions
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Position on the role ladder. Higher rank means more privilege.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Member => 0,
            Role::Admin => 1,
            Role::Owner => 2,
        }
    }

    /// Whether this role meets a minimum role requirement.
    pub fn satisfies(&self, minimum: Role) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Highest role in a set of memberships, if any.
pub fn max_role(roles: &[Role]) -> Option<Role> {
    roles.iter().copied().max()
}

/// A tenant organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    /// User who created the org (and received its first owner membership)
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Links a user to one organization with one role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub org_id: OrgId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Membership row joined with user details, as shown in member listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

/// Membership joined with organization details, used during login to pick
/// the session's organization context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipWithOrg {
    pub org_id: OrgId,
    pub org_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
