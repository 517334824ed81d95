//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the flat RBAC system.
///
/// `Admin` satisfies any requirement; `User` satisfies only `User`-level
/// requirements. There is no further hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular account: may only act on resources it owns.
    User,
    /// Full administrator: may act on any resource and change roles.
    Admin,
}

impl UserRole {
    /// Check if this role satisfies the given requirement.
    pub fn satisfies(&self, required: &UserRole) -> bool {
        match self {
            Self::Admin => true,
            Self::User => matches!(required, Self::User),
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as its canonical uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = credhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(credhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: USER, ADMIN"
            ))),
        }
    }
}
