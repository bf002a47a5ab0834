use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::AppError;

/// Username and password decoded from an `Authorization: Basic ...` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl BasicCredentials {
    /// Parse the value of an `Authorization` header.
    pub fn from_header(value: &str) -> Result<Self, AppError> {
        let encoded = value
            .strip_prefix("Basic ")
            .or_else(|| value.strip_prefix("basic "))
            .ok_or_else(|| AppError::Auth("Unsupported authorization scheme".to_string()))?;

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::Auth("Malformed basic credentials".to_string()))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AppError::Auth("Malformed basic credentials".to_string()))?;

        // Passwords may contain ':', user names may not
        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| AppError::Auth("Malformed basic credentials".to_string()))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// The user a request was authenticated as, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_for(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parse_valid_header() {
        let creds = BasicCredentials::from_header(&header_for("testuser:T3stP4ss#")).unwrap();
        assert_eq!(creds.username, "testuser");
        assert_eq!(creds.password, "T3stP4ss#");
    }

    #[test]
    fn test_password_with_colon() {
        let creds = BasicCredentials::from_header(&header_for("alice:pa:ss")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pa:ss");
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            BasicCredentials::from_header("Bearer abc.def.ghi"),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_rejects_bad_base64_and_missing_separator() {
        assert!(BasicCredentials::from_header("Basic !!!").is_err());
        assert!(BasicCredentials::from_header(&header_for("nocolon")).is_err());
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = BasicCredentials::from_header(&header_for("bob:S3cret!x")).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("S3cret"));
    }
}
