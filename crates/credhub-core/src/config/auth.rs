//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Substrings that mark a signing secret as unfit for production.
const WEAK_SECRET_MARKERS: &[&str] = &[
    "secret", "test", "changeme", "password", "default", "example",
];

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access-token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Secret key for refresh-secret digests (HMAC-SHA256). Must differ
    /// from `jwt_secret`.
    #[serde(default = "default_refresh_secret")]
    pub refresh_digest_secret: String,
    /// Issuer tag embedded in every access token.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh session TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_TOO_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "credhub".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_password_min() -> usize {
    12
}

impl AuthConfig {
    /// Reject weak or shared signing secrets.
    ///
    /// Called at startup in production; a predictable secret or a single
    /// key reused for both token signing and refresh digests is fatal.
    pub fn ensure_strong_secrets(&self) -> Result<(), AppError> {
        let weak = |s: &str| {
            let lower = s.to_lowercase();
            s.len() < 24 || WEAK_SECRET_MARKERS.iter().any(|m| lower.contains(m))
        };

        if weak(&self.jwt_secret) || weak(&self.refresh_digest_secret) {
            return Err(AppError::configuration(
                "Weak signing secret detected. Use strong, unique secrets in production.",
            ));
        }
        if self.jwt_secret == self.refresh_digest_secret {
            return Err(AppError::configuration(
                "jwt_secret and refresh_digest_secret must not be identical.",
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            refresh_digest_secret: default_refresh_secret(),
            issuer: default_issuer(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
        }
    }
}
