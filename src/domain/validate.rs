//! Field-level validation for incoming writes.

use thiserror::Error;

use super::models::{CreateNotificationRequest, NewNotification, NotificationPatch};

pub const MESSAGE_MIN_LENGTH: usize = 5;
pub const MESSAGE_MAX_LENGTH: usize = 250;
pub const CATEGORY_NAME_MIN_LENGTH: usize = 3;
pub const CATEGORY_NAME_MAX_LENGTH: usize = 150;
pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(ValidationError::new(
            field,
            format!("The {} must be between {} and {} characters long", field, min, max),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(
            field,
            format!("The {} cannot be negative", field),
        ));
    }
    Ok(())
}

pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    validate_length("message", message, MESSAGE_MIN_LENGTH, MESSAGE_MAX_LENGTH)
}

pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    validate_length("name", name, CATEGORY_NAME_MIN_LENGTH, CATEGORY_NAME_MAX_LENGTH)
}

pub fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    validate_length("name", name, USER_NAME_MIN_LENGTH, USER_NAME_MAX_LENGTH)?;
    // Basic credentials split on the first ':', so such a name could never log in
    if name.contains(':') {
        return Err(ValidationError::new("name", "The name cannot contain ':'"));
    }
    Ok(())
}

impl CreateNotificationRequest {
    /// Validate every field and produce the storable form.
    pub fn validate(self) -> Result<NewNotification, ValidationError> {
        validate_message(&self.message)?;
        validate_non_negative("ttl", self.ttl)?;

        let category_name = self.notification_category.into_name();
        validate_length(
            "notification_category",
            &category_name,
            CATEGORY_NAME_MIN_LENGTH,
            CATEGORY_NAME_MAX_LENGTH,
        )?;

        Ok(NewNotification {
            message: self.message,
            ttl: self.ttl,
            category_name,
        })
    }
}

impl NotificationPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(message) = &self.message {
            validate_message(message)?;
        }
        if let Some(ttl) = self.ttl {
            validate_non_negative("ttl", ttl)?;
        }
        if let Some(displayed_times) = self.displayed_times {
            validate_non_negative("displayed_times", displayed_times)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CategoryReference;

    fn request(message: &str, ttl: i32, category: &str) -> CreateNotificationRequest {
        CreateNotificationRequest {
            message: message.to_string(),
            ttl,
            notification_category: CategoryReference::Name(category.to_string()),
        }
    }

    #[test]
    fn test_valid_notification() {
        let new = request("Backup finished", 15, "Information").validate().unwrap();
        assert_eq!(new.category_name, "Information");
        assert_eq!(new.ttl, 15);
    }

    #[test]
    fn test_short_message_rejected() {
        let err = request("Hey", 15, "Information").validate().unwrap_err();
        assert_eq!(err.field, "message");
    }

    #[test]
    fn test_negative_ttl_rejected() {
        let err = request("Backup finished", -1, "Information")
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "ttl");
    }

    #[test]
    fn test_short_category_rejected() {
        let err = request("Backup finished", 1, "IO").validate().unwrap_err();
        assert_eq!(err.field, "notification_category");
    }

    #[test]
    fn test_name_bounds() {
        assert!(validate_category_name("Err").is_ok());
        assert!(validate_category_name("Er").is_err());
        assert!(validate_user_name(&"u".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(validate_user_name(&"u".repeat(USER_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_user_name_rejects_colon() {
        let err = validate_user_name("a:b:c").unwrap_err();
        assert_eq!(err.field, "name");
        assert!(validate_user_name("ops-team").is_ok());
    }

    #[test]
    fn test_patch_validation() {
        let patch = NotificationPatch {
            displayed_times: Some(-2),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap_err().field, "displayed_times");
        assert!(NotificationPatch::default().validate().is_ok());
    }
}
