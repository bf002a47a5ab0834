//! Entities and write requests for users, categories and notifications.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A registered API user. Only the password hash is ever held.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
    pub creation_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationCategory {
    pub id: i64,
    pub name: String,
}

/// A notification joined with the category it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    /// Seconds the notification should be displayed
    pub ttl: i32,
    pub creation_date: DateTime<Utc>,
    pub category: NotificationCategory,
    pub displayed_times: i32,
    pub displayed_once: bool,
}

/// A category referenced from a notification body, either as a bare name
/// or as an object carrying the name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryReference {
    Name(String),
    Object { name: String },
}

impl CategoryReference {
    pub fn name(&self) -> &str {
        match self {
            CategoryReference::Name(name) => name,
            CategoryReference::Object { name } => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            CategoryReference::Name(name) => name,
            CategoryReference::Object { name } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    pub message: String,
    pub ttl: i32,
    pub notification_category: CategoryReference,
}

/// Fields a PATCH may change; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPatch {
    pub message: Option<String>,
    pub ttl: Option<i32>,
    pub displayed_times: Option<i32>,
    pub displayed_once: Option<bool>,
}

impl NotificationPatch {
    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.ttl.is_none()
            && self.displayed_times.is_none()
            && self.displayed_once.is_none()
    }

    /// Apply the present fields onto `notification`.
    pub fn apply_to(&self, notification: &mut Notification) {
        if let Some(message) = &self.message {
            notification.message = message.clone();
        }
        if let Some(ttl) = self.ttl {
            notification.ttl = ttl;
        }
        if let Some(displayed_times) = self.displayed_times {
            notification.displayed_times = displayed_times;
        }
        if let Some(displayed_once) = self.displayed_once {
            notification.displayed_once = displayed_once;
        }
    }
}

/// A validated notification ready to be stored.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub message: String,
    pub ttl: i32,
    pub category_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Notification {
        Notification {
            id: 1,
            message: "Server restarted".to_string(),
            ttl: 30,
            creation_date: Utc::now(),
            category: NotificationCategory {
                id: 1,
                name: "Information".to_string(),
            },
            displayed_times: 0,
            displayed_once: false,
        }
    }

    #[test]
    fn test_category_reference_forms() {
        let bare: CreateNotificationRequest = serde_json::from_value(json!({
            "message": "Disk almost full",
            "ttl": 10,
            "notification_category": "Warning"
        }))
        .unwrap();
        assert_eq!(bare.notification_category.name(), "Warning");

        let object: CreateNotificationRequest = serde_json::from_value(json!({
            "message": "Disk almost full",
            "ttl": 10,
            "notification_category": {"name": "Warning"}
        }))
        .unwrap();
        assert_eq!(object.notification_category.into_name(), "Warning");
    }

    #[test]
    fn test_patch_changes_only_present_fields() {
        let mut notification = sample();
        let before = notification.clone();

        let patch: NotificationPatch =
            serde_json::from_value(json!({"displayed_times": 3})).unwrap();
        patch.apply_to(&mut notification);

        assert_eq!(notification.displayed_times, 3);
        assert_eq!(notification.message, before.message);
        assert_eq!(notification.ttl, before.ttl);
        assert_eq!(notification.displayed_once, before.displayed_once);
        assert_eq!(notification.category, before.category);
    }

    #[test]
    fn test_empty_patch() {
        assert!(NotificationPatch::default().is_empty());
        let patch = NotificationPatch {
            displayed_once: Some(true),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
