//! Structured audit metadata.
//!
//! Each action kind that carries metadata has its own variant, so the
//! payloads form a closed set and sanitization can be checked exhaustively
//! instead of guessing at an open map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserRole;

/// Why a refresh attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshFailureReason {
    /// No session matches the presented secret's digest.
    NotFound,
    /// The session exists but its expiry has passed.
    Expired,
}

/// Structured per-action audit payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditMetadata {
    /// Login failed before the user was identified.
    LoginFailure {
        /// The email that was presented.
        email: String,
    },
    /// A refresh secret could not be exchanged.
    RefreshFailure {
        /// Discriminating reason, audit-only.
        reason: RefreshFailureReason,
    },
    /// An already-revoked refresh secret was replayed.
    TokenReuse {
        /// The stale session whose secret was replayed.
        session_id: Uuid,
        /// When that session was revoked.
        revoked_at: DateTime<Utc>,
    },
    /// A session was revoked by logout.
    Logout {
        /// The revoked session.
        session_id: Uuid,
    },
    /// Logout found no active session for the presented secret.
    LogoutFailure {
        /// Always `"not_found"`; kept explicit for the audit trail.
        reason: String,
    },
    /// An administrator changed a user's role.
    RoleChange {
        /// The user whose role changed.
        target_user_id: Uuid,
        /// The newly assigned role.
        new_role: UserRole,
    },
    /// A role change could not be applied.
    RoleChangeFailure {
        /// The user the change targeted.
        target_user_id: Uuid,
        /// Why it failed.
        reason: String,
    },
    /// An authorization decision denied access.
    AccessDenied {
        /// The specific resource probed, if any.
        resource_id: Option<Uuid>,
        /// Why access was denied.
        reason: String,
    },
}
