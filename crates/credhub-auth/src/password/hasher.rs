//! Argon2id password hashing and verification.
//!
//! Treated as an opaque one-way hash/verify capability; algorithm tuning
//! stays with the `argon2` defaults.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

use credhub_core::error::AppError;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password with a random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Correct-Horse-9!").unwrap();

        assert!(hasher.verify(&hash, "Correct-Horse-9!").unwrap());
        assert!(!hasher.verify(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn hash_is_salted() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("Correct-Horse-9!").unwrap();
        let b = hasher.hash("Correct-Horse-9!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_does_not_contain_plaintext() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("Correct-Horse-9!").unwrap();
        assert!(!hash.contains("Correct-Horse-9!"));
    }
}
