//! Refresh-secret generation and digesting.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use credhub_core::config::auth::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Raw entropy of each refresh secret: 48 bytes = 384 bits.
const SECRET_BYTES: usize = 48;

/// A freshly generated refresh secret.
///
/// The `secret` is handed to the caller exactly once and never stored;
/// `digest` is its only persisted trace.
#[derive(Debug, Clone)]
pub struct IssuedRefreshSecret {
    /// The opaque secret (base64url).
    pub secret: String,
    /// Keyed one-way digest of the secret (hex).
    pub digest: String,
    /// Absolute expiry of the session this secret will back.
    pub expires_at: DateTime<Utc>,
}

/// Generates refresh secrets and computes their storage digests.
#[derive(Clone)]
pub struct RefreshTokenGenerator {
    /// HMAC key for digests; distinct from the token-signing secret.
    digest_key: Vec<u8>,
    /// Refresh session TTL in days.
    refresh_ttl_days: i64,
}

impl std::fmt::Debug for RefreshTokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenGenerator")
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

impl RefreshTokenGenerator {
    /// Creates a new generator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            digest_key: config.refresh_digest_secret.as_bytes().to_vec(),
            refresh_ttl_days: config.refresh_ttl_days as i64,
        }
    }

    /// Generates a new high-entropy refresh secret with its digest and
    /// expiry.
    pub fn generate(&self) -> IssuedRefreshSecret {
        let mut raw = [0u8; SECRET_BYTES];
        OsRng.fill_bytes(&mut raw);
        let secret = URL_SAFE_NO_PAD.encode(raw);
        let digest = self.digest_of(&secret);
        let expires_at = Utc::now() + chrono::Duration::days(self.refresh_ttl_days);

        IssuedRefreshSecret {
            secret,
            digest,
            expires_at,
        }
    }

    /// Computes the keyed HMAC-SHA256 digest of a presented secret.
    ///
    /// Deterministic, so stored sessions can be looked up by digest, and
    /// one-way, so a leaked database never yields usable secrets.
    pub fn digest_of(&self, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.digest_key)
            .expect("HMAC can take key of any size");
        mac.update(secret.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> RefreshTokenGenerator {
        RefreshTokenGenerator::new(&AuthConfig::default())
    }

    #[test]
    fn digest_is_deterministic() {
        let g = generator();
        let issued = g.generate();
        assert_eq!(issued.digest, g.digest_of(&issued.secret));
        assert_eq!(g.digest_of(&issued.secret), g.digest_of(&issued.secret));
    }

    #[test]
    fn digest_never_contains_the_secret() {
        let g = generator();
        let issued = g.generate();
        assert!(!issued.digest.contains(&issued.secret));
        assert_ne!(issued.digest, issued.secret);
    }

    #[test]
    fn secrets_are_unique_and_high_entropy() {
        let g = generator();
        let a = g.generate();
        let b = g.generate();
        assert_ne!(a.secret, b.secret);
        // 48 raw bytes -> 64 base64url characters.
        assert_eq!(a.secret.len(), 64);
    }

    #[test]
    fn digest_is_keyed() {
        let a = generator();
        let b = RefreshTokenGenerator::new(&AuthConfig {
            refresh_digest_secret: "another-digest-key-entirely".to_string(),
            ..AuthConfig::default()
        });
        let secret = a.generate().secret;
        assert_ne!(a.digest_of(&secret), b.digest_of(&secret));
    }
}
