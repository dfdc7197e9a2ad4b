//! Session management for cookie-based authentication.
//!
//! A session binds a user to one organization for its whole lifetime. Rows
//! are validated lazily: an expired session stays in the database and is
//! simply rejected on use, so there is no background sweeper to race against.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::auth::models::{AuthError, SessionIdentity};
use crate::domain::{OrgId, UserId};
use crate::errors::Result;
use crate::storage::repositories::{SessionRepository, SqlxSessionRepository};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "ik_session";

/// Session token byte length (32 bytes = 256 bits of entropy)
const SESSION_TOKEN_BYTES: usize = 32;

/// Stored representation of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub org_id: OrgId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid strictly before its expiry instant.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Generate an opaque session token from OS randomness.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the session cookie for a freshly created session.
///
/// HTTP-only keeps the token away from scripts; SameSite=Lax still allows
/// top-level navigation to carry it. The Secure flag follows the environment.
pub fn build_session_cookie(
    token: &str,
    expires_at: DateTime<Utc>,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if let Ok(expires) = time::OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie.set_expires(expires);
    }
    cookie
}

/// Build a cookie that removes the session cookie from the browser.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_expires(time::OffsetDateTime::UNIX_EPOCH);
    cookie
}

/// Service for creating, resolving, and destroying sessions.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>, ttl: Duration) -> Self {
        Self { sessions, ttl }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, ttl: Duration) -> Self {
        Self::new(Arc::new(SqlxSessionRepository::new(pool)), ttl)
    }

    /// Create a session pinned to one organization.
    #[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
    pub async fn create_session(&self, user_id: &UserId, org_id: &OrgId) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            token: generate_session_token(),
            user_id: user_id.clone(),
            org_id: org_id.clone(),
            expires_at: now + self.ttl,
            created_at: now,
        };
        self.sessions.create_session(&session).await?;
        debug!(user_id = %user_id, org_id = %org_id, "session created");
        Ok(session)
    }

    /// Resolve a cookie token into a session identity.
    ///
    /// Unknown tokens and expired sessions are distinguished so clients can
    /// tell a lost cookie from a timed-out one. Expired rows are left in
    /// place; validity is checked on every request anyway.
    pub async fn resolve_session(
        &self,
        token: &str,
    ) -> std::result::Result<SessionIdentity, AuthError> {
        let session = self.sessions.find_by_token(token).await?.ok_or(AuthError::NoSession)?;
        if !session.is_valid(Utc::now()) {
            return Err(AuthError::SessionExpired);
        }
        Ok(SessionIdentity { user_id: session.user_id, org_id: session.org_id })
    }

    /// Delete a session row. Deleting an unknown token is a no-op, so logout
    /// is idempotent.
    #[instrument(skip(self, token))]
    pub async fn destroy_session(&self, token: &str) -> Result<()> {
        self.sessions.delete_by_token(token).await?;
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
