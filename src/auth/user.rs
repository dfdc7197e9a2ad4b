//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserId;

/// A user account as persisted, minus the credential.
///
/// The password hash is deliberately kept off this struct; lookups that need
/// it go through [`UserWithHash`] so the hash never rides along into
/// responses or logs by accident.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Normalize email for storage and comparison. Emails are matched
    /// case-insensitively everywhere, so they are stored lowercased.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

/// User account plus its password hash, used only by credential checks.
#[derive(Debug, Clone)]
pub struct UserWithHash {
    pub user: User,
    pub password_hash: String,
}
