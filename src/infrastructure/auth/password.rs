//! Password policy and Argon2 hashing.
//!
//! Only the PHC-formatted hash produced here is ever persisted; the
//! plaintext never leaves the request handler.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lazy_static::lazy_static;
use thiserror::Error;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 32;

/// Characters accepted as the mandatory symbol.
pub const PASSWORD_SYMBOLS: &str = " !\"#$%&'()*+,-./[\\]^_`{|}~";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("The password is too short. Please specify a password with at least 8 characters.")]
    TooShort,

    #[error("The password is too long. Please specify a password with no more than 32 characters.")]
    TooLong,

    #[error("The password must include at least one uppercase letter.")]
    MissingUppercase,

    #[error("The password must include at least one lowercase letter.")]
    MissingLowercase,

    #[error("The password must include at least one number.")]
    MissingDigit,

    #[error("The password must include at least one symbol.")]
    MissingSymbol,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Check a candidate password against the strength policy.
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if length > PASSWORD_MAX_LENGTH {
        return Err(PasswordError::TooLong);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(PasswordError::MissingSymbol);
    }
    Ok(())
}

/// Validate the policy, then hash with a fresh random salt.
///
/// CPU heavy; call from `spawn_blocking` in async contexts.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Re-hash `password` with the scheme and salt recorded in `hash` and compare.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

lazy_static! {
    /// Hash with the default parameters, verified against when the user is unknown.
    static ref DUMMY_HASH: Option<String> = hash_password("Unkn0wn-user").ok();
}

/// Spend the same Argon2 work as `verify_password` without a stored hash,
/// so unknown user names answer as slowly as wrong passwords. Always `false`.
pub fn verify_unknown_user(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "T3stP4ss#";

    #[test]
    fn test_unknown_user_runs_a_real_verification() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_unknown_user("Unkn0wn-user"));
        assert!(!verify_unknown_user(STRONG));
    }

    #[test]
    fn test_seven_characters_rejected() {
        assert_eq!(
            validate_password_strength("T3stP4#"),
            Err(PasswordError::TooShort)
        );
    }

    #[test]
    fn test_length_bounds() {
        let at_max = format!("Aa1#{}", "x".repeat(PASSWORD_MAX_LENGTH - 4));
        assert!(validate_password_strength(&at_max).is_ok());

        let over_max = format!("{}y", at_max);
        assert_eq!(
            validate_password_strength(&over_max),
            Err(PasswordError::TooLong)
        );
    }

    #[test]
    fn test_each_character_class_required() {
        assert_eq!(
            validate_password_strength("t3stp4ss#"),
            Err(PasswordError::MissingUppercase)
        );
        assert_eq!(
            validate_password_strength("T3STP4SS#"),
            Err(PasswordError::MissingLowercase)
        );
        assert_eq!(
            validate_password_strength("TestPass#"),
            Err(PasswordError::MissingDigit)
        );
        assert_eq!(
            validate_password_strength("T3stP4ss1"),
            Err(PasswordError::MissingSymbol)
        );
    }

    #[test]
    fn test_symbols_outside_set_do_not_count() {
        // '@' and ':' are punctuation but not in the accepted set
        assert_eq!(
            validate_password_strength("T3stP4ss@:"),
            Err(PasswordError::MissingSymbol)
        );
        assert!(validate_password_strength("T3st P4ss").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password(STRONG).unwrap();
        assert_ne!(hash, STRONG);
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password(STRONG, &hash).unwrap());
        assert!(!verify_password("Wr0ngPass!", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password(STRONG).unwrap();
        let second = hash_password(STRONG).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_weak_password_never_hashed() {
        assert_eq!(hash_password("short"), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password(STRONG, "not-a-phc-string"),
            Err(PasswordError::Hash(_))
        ));
    }
}
