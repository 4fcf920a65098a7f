//! Password hashing and credential checks

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;

/// Minimum password length (in characters) when the config does not override it
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("password does not match")]
    InvalidPassword,
    #[error("stored password hash is malformed")]
    MalformedHash,
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// The returned PHC string carries the algorithm parameters and the salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailed(e.to_string()))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|_| AuthError::MalformedHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}

/// Length check in characters, not bytes.
pub fn is_strong_enough(password: &str, min_len: usize) -> bool {
    password.chars().count() >= min_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "secret1";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(password));
        assert!(verify_password(password, &hash).is_ok());
        assert_eq!(verify_password("wrongpass", &hash), Err(AuthError::InvalidPassword));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        assert_eq!(verify_password("secret1", "secret1"), Err(AuthError::MalformedHash));
    }

    #[test]
    fn test_strength_counts_characters() {
        assert!(!is_strong_enough("12345", DEFAULT_MIN_PASSWORD_LEN));
        assert!(is_strong_enough("123456", DEFAULT_MIN_PASSWORD_LEN));
        // Five characters, ten bytes
        assert!(is_strong_enough("ééééé", 5));
        assert!(!is_strong_enough("ééééé", 6));
    }
}
