//! Password policy enforcement for new passwords.

use credhub_core::config::auth::AuthConfig;
use credhub_core::error::AppError;

/// Validates password strength against configured policies.
///
/// Login never applies policy; only registration does. Existing accounts
/// must stay able to log in after the policy tightens.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordPolicy {
    /// Creates a new policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a candidate password.
    ///
    /// Returns `Ok(())` if the password meets all requirements, or an
    /// error describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.len() > 128 {
            return Err(AppError::validation(
                "Password must be at most 128 characters long",
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::new(&AuthConfig::default())
    }

    #[test]
    fn strong_password_is_accepted() {
        assert!(policy().validate("Str0ng-enough-pass!").is_ok());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let p = policy();
        assert!(p.validate("Sh0rt!").is_err()); // too short
        assert!(p.validate("all-lowercase-pass1!").is_err()); // no uppercase
        assert!(p.validate("ALL-UPPERCASE-PASS1!").is_err()); // no lowercase
        assert!(p.validate("No-Digits-In-Here!").is_err()); // no digit
        assert!(p.validate("NoSymbolsInHere123").is_err()); // no symbol
    }
}
