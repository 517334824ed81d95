//! Access-token creation and validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use credhub_core::config::auth::AuthConfig;
use credhub_core::error::AppError;
use credhub_entity::user::UserRole;

use super::claims::AccessClaims;

/// Result of a successful access-token issuance.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    /// The signed token.
    pub token: String,
    /// When it expires.
    pub expires_at: DateTime<Utc>,
}

/// Creates and validates signed access tokens.
///
/// Validation is a pure function of the token, the signing secret, and the
/// clock; the session store is never consulted. The deliberate cost is
/// that an access token stays valid until its own expiry, which is why the
/// TTL is short.
#[derive(Clone)]
pub struct TokenCodec {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Issuer tag stamped into every token.
    issuer: String,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a new codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew
        validation.set_issuer(&[&config.issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl_minutes: config.access_ttl_minutes as i64,
        }
    }

    /// Signs a new access token for the given subject and role.
    pub fn issue_access_token(
        &self,
        subject: Uuid,
        role: UserRole,
    ) -> Result<IssuedAccessToken, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let claims = AccessClaims {
            sub: subject,
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks signature, expiration (with leeway), issuer, and payload
    /// shape. All failures collapse to `Unauthorized`.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid token signature")
                }
                _ => AppError::unauthorized("Invalid token"),
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credhub_core::error::ErrorKind;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::default())
    }

    #[test]
    fn issued_token_roundtrips() {
        let codec = codec();
        let subject = Uuid::new_v4();
        let issued = codec.issue_access_token(subject, UserRole::Admin).unwrap();

        let claims = codec.verify_access_token(&issued.token).unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.iss, "credhub");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig::default();
        let codec = TokenCodec::new(&config);

        let now = Utc::now();
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            role: UserRole::User,
            iss: config.issuer.clone(),
            iat: (now - chrono::Duration::minutes(30)).timestamp(),
            exp: (now - chrono::Duration::minutes(15)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = codec.verify_access_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let codec = codec();
        let other = TokenCodec::new(&AuthConfig {
            jwt_secret: "a-completely-different-signing-secret".to_string(),
            ..AuthConfig::default()
        });

        let issued = other
            .issue_access_token(Uuid::new_v4(), UserRole::User)
            .unwrap();
        assert!(codec.verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let codec = codec();
        let other = TokenCodec::new(&AuthConfig {
            issuer: "someone-else".to_string(),
            ..AuthConfig::default()
        });

        let issued = other
            .issue_access_token(Uuid::new_v4(), UserRole::User)
            .unwrap();
        assert!(codec.verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(codec().verify_access_token("not-a-jwt").is_err());
    }
}
