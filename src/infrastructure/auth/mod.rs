mod basic;
mod password;

pub use basic::{AuthenticatedUser, BasicCredentials};
pub use password::{
    hash_password, validate_password_strength, verify_password, verify_unknown_user, PasswordError,
    PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, PASSWORD_SYMBOLS,
};
