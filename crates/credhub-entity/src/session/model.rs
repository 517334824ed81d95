//! Refresh session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One issued refresh credential.
///
/// Only the one-way digest of the secret is ever stored. A session is
/// created on every successful login, registration, or refresh; it is
/// mutated exactly once, to set `revoked_at`, and never deleted — revoked
/// rows are the evidence that makes reuse detection possible.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Keyed HMAC-SHA256 digest of the refresh secret (hex).
    pub token_digest: String,
    /// When the session expires (absolute).
    pub expires_at: DateTime<Utc>,
    /// When the session was revoked. Monotonic: never cleared.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Check whether the session has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check whether the session has expired against the given clock.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Check whether the session is active: not revoked and not expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }
}

/// Data required to create a new refresh session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefreshSession {
    /// The owning user.
    pub user_id: Uuid,
    /// Digest of the refresh secret.
    pub token_digest: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
