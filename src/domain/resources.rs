//! JSON representations of stored entities, with hyperlinks.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::{Notification, NotificationCategory, User};

/// Builds absolute resource URLs below the API root,
/// e.g. `http://host:8081/service`.
#[derive(Debug, Clone)]
pub struct ResourceUrls {
    api_root: String,
}

impl ResourceUrls {
    pub fn new(api_root: impl Into<String>) -> Self {
        let api_root = api_root.into();
        Self {
            api_root: api_root.trim_end_matches('/').to_string(),
        }
    }

    pub fn notifications(&self) -> String {
        format!("{}/notifications/", self.api_root)
    }

    pub fn notification(&self, id: i64) -> String {
        format!("{}/notifications/{}", self.api_root, id)
    }

    pub fn categories(&self) -> String {
        format!("{}/notification_categories/", self.api_root)
    }

    pub fn category(&self, id: i64) -> String {
        format!("{}/notification_categories/{}", self.api_root, id)
    }

    pub fn users(&self) -> String {
        format!("{}/users/", self.api_root)
    }

    pub fn user(&self, id: i64) -> String {
        format!("{}/users/{}", self.api_root, id)
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryLink {
    pub id: i64,
    pub url: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationResource {
    pub id: i64,
    pub url: String,
    pub message: String,
    pub ttl: i32,
    pub creation_date: DateTime<Utc>,
    /// Omitted when nested inside its own category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_category: Option<CategoryLink>,
    pub displayed_times: i32,
    pub displayed_once: bool,
}

impl NotificationResource {
    pub fn new(notification: Notification, urls: &ResourceUrls) -> Self {
        let category = CategoryLink {
            id: notification.category.id,
            url: urls.category(notification.category.id),
            name: notification.category.name,
        };

        Self {
            id: notification.id,
            url: urls.notification(notification.id),
            message: notification.message,
            ttl: notification.ttl,
            creation_date: notification.creation_date,
            notification_category: Some(category),
            displayed_times: notification.displayed_times,
            displayed_once: notification.displayed_once,
        }
    }

    /// Representation used inside a category, without the back reference.
    pub fn nested(notification: Notification, urls: &ResourceUrls) -> Self {
        Self {
            notification_category: None,
            ..Self::new(notification, urls)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResource {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub notifications: Vec<NotificationResource>,
}

impl CategoryResource {
    pub fn new(
        category: NotificationCategory,
        notifications: Vec<Notification>,
        urls: &ResourceUrls,
    ) -> Self {
        Self {
            id: category.id,
            url: urls.category(category.id),
            name: category.name,
            notifications: notifications
                .into_iter()
                .map(|n| NotificationResource::nested(n, urls))
                .collect(),
        }
    }
}

/// Public view of a user; the password hash is never serialized.
#[derive(Debug, Serialize)]
pub struct UserResource {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub creation_date: DateTime<Utc>,
}

impl UserResource {
    pub fn new(user: User, urls: &ResourceUrls) -> Self {
        Self {
            id: user.id,
            url: urls.user(user.id),
            name: user.name,
            creation_date: user.creation_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> ResourceUrls {
        ResourceUrls::new("http://localhost:8081/service/")
    }

    fn notification() -> Notification {
        Notification {
            id: 3,
            message: "Certificate expires soon".to_string(),
            ttl: 60,
            creation_date: Utc::now(),
            category: NotificationCategory {
                id: 9,
                name: "Warning".to_string(),
            },
            displayed_times: 1,
            displayed_once: true,
        }
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let urls = urls();
        assert_eq!(urls.notification(3), "http://localhost:8081/service/notifications/3");
        assert_eq!(urls.categories(), "http://localhost:8081/service/notification_categories/");
    }

    #[test]
    fn test_notification_links_category() {
        let resource = NotificationResource::new(notification(), &urls());
        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(json["url"], "http://localhost:8081/service/notifications/3");
        assert_eq!(json["notification_category"]["name"], "Warning");
        assert_eq!(
            json["notification_category"]["url"],
            "http://localhost:8081/service/notification_categories/9"
        );
    }

    #[test]
    fn test_nested_notification_omits_category() {
        let category = notification().category.clone();
        let resource = CategoryResource::new(category, vec![notification()], &urls());
        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(json["notifications"].as_array().unwrap().len(), 1);
        assert!(json["notifications"][0].get("notification_category").is_none());
    }

    #[test]
    fn test_user_hides_password_hash() {
        let user = User {
            id: 1,
            name: "testuser".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            creation_date: Utc::now(),
        };
        let json = serde_json::to_string(&UserResource::new(user, &urls())).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
