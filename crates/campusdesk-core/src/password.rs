use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

/// Suffix appended to the email prefix for accounts created on someone's behalf.
pub const DEFAULT_PASSWORD_SUFFIX: &str = "@123";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// Initial password for admin-created and bulk-imported students and faculty:
/// the first three characters of the email followed by `@123`.
pub fn default_password_for(email: &str) -> String {
    let prefix: String = email.chars().take(3).collect();
    format!("{}{}", prefix, DEFAULT_PASSWORD_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_password_uses_email_prefix() {
        assert_eq!(default_password_for("john@campus.edu"), "joh@123");
    }

    #[test]
    fn test_default_password_short_email() {
        assert_eq!(default_password_for("ab"), "ab@123");
    }

    #[test]
    fn test_default_password_is_char_aware() {
        assert_eq!(default_password_for("éçà@x.io"), "éçà@123");
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("joh@123").unwrap();
        assert_ne!(hashed, "joh@123");
        assert!(verify_password("joh@123", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }
}
