//! Audit action vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of security-relevant actions recorded in the audit log.
///
/// Every variant corresponds to exactly one outcome of a lifecycle or
/// authorization operation; there is no catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A login succeeded.
    LoginSuccess,
    /// A login failed (unknown user or wrong password).
    LoginFailure,
    /// A refresh secret was successfully exchanged for a new pair.
    TokenRefresh,
    /// A refresh attempt failed (secret unknown or session expired).
    TokenRefreshFailure,
    /// An already-revoked refresh secret was replayed — theft signal.
    TokenReuseAttempt,
    /// A refresh session was revoked at the owner's request.
    Logout,
    /// A logout presented a secret with no active session.
    LogoutFailure,
    /// An administrator changed a user's role.
    RoleChange,
    /// A role change failed (target user absent).
    RoleChangeFailure,
    /// An authorization decision denied access.
    AccessDenied,
}

impl AuditAction {
    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFailure => "LOGIN_FAILURE",
            Self::TokenRefresh => "TOKEN_REFRESH",
            Self::TokenRefreshFailure => "TOKEN_REFRESH_FAILURE",
            Self::TokenReuseAttempt => "TOKEN_REUSE_ATTEMPT",
            Self::Logout => "LOGOUT",
            Self::LogoutFailure => "LOGOUT_FAILURE",
            Self::RoleChange => "ROLE_CHANGE",
            Self::RoleChangeFailure => "ROLE_CHANGE_FAILURE",
            Self::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&AuditAction::TokenReuseAttempt).unwrap();
        assert_eq!(json, "\"TOKEN_REUSE_ATTEMPT\"");
        let back: AuditAction = serde_json::from_str("\"LOGIN_FAILURE\"").unwrap();
        assert_eq!(back, AuditAction::LoginFailure);
    }
}
