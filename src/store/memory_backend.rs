//! In-memory notification store.
//!
//! All tables and id counters live behind one mutex, so every
//! check-then-write sequence is atomic with respect to other requests.
//! Data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{NewNotification, Notification, NotificationCategory, NotificationPatch, PageRequest, User};

use super::backend::{CategoryResolution, NotificationStore, StoreError, StoreResult};
use super::uniqueness::{is_unique, UniqueField};

#[derive(Debug, Clone)]
struct NotificationRow {
    id: i64,
    message: String,
    ttl: i32,
    creation_date: DateTime<Utc>,
    category_id: i64,
    displayed_times: i32,
    displayed_once: bool,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, NotificationCategory>,
    notifications: BTreeMap<i64, NotificationRow>,
    last_user_id: i64,
    last_category_id: i64,
    last_notification_id: i64,
}

impl Tables {
    fn user_holding(&self, name: &str) -> Option<i64> {
        self.users.values().find(|u| u.name == name).map(|u| u.id)
    }

    fn category_holding(&self, name: &str) -> Option<i64> {
        self.categories
            .values()
            .find(|c| c.name == name)
            .map(|c| c.id)
    }

    fn notification_holding(&self, message: &str) -> Option<i64> {
        self.notifications
            .values()
            .find(|n| n.message == message)
            .map(|n| n.id)
    }

    fn join(&self, row: &NotificationRow) -> Notification {
        // Rows never outlive their category: deletes cascade under the same lock
        let category = self
            .categories
            .get(&row.category_id)
            .cloned()
            .unwrap_or(NotificationCategory {
                id: row.category_id,
                name: String::new(),
            });

        Notification {
            id: row.id,
            message: row.message.clone(),
            ttl: row.ttl,
            creation_date: row.creation_date,
            category,
            displayed_times: row.displayed_times,
            displayed_once: row.displayed_once,
        }
    }

    fn insert_category(&mut self, name: &str) -> NotificationCategory {
        self.last_category_id += 1;
        let category = NotificationCategory {
            id: self.last_category_id,
            name: name.to_string(),
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    fn resolve_category(&mut self, name: &str) -> CategoryResolution {
        match self.category_holding(name) {
            Some(id) => CategoryResolution::Found(self.categories[&id].clone()),
            None => CategoryResolution::Created(self.insert_category(name)),
        }
    }
}

fn page_of<T: Clone>(items: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    items
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

/// In-memory store backend.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, name: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;

        if !is_unique(tables.user_holding(name), None) {
            return Err(StoreError::Duplicate {
                field: UniqueField::UserName,
                value: name.to_string(),
            });
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            creation_date: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        tracing::debug!(user_id = user.id, name = %user.name, "User stored in memory");
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let tables = self.tables.lock().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { resource: "User", id })
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.name == name).cloned())
    }

    async fn list_users(&self, page: PageRequest) -> StoreResult<(Vec<User>, u64)> {
        let tables = self.tables.lock().await;
        let total = tables.users.len() as u64;
        Ok((page_of(tables.users.values().cloned(), page), total))
    }

    async fn create_category(&self, name: &str) -> StoreResult<NotificationCategory> {
        let mut tables = self.tables.lock().await;

        if !is_unique(tables.category_holding(name), None) {
            return Err(StoreError::Duplicate {
                field: UniqueField::CategoryName,
                value: name.to_string(),
            });
        }

        let category = tables.insert_category(name);
        tracing::debug!(category_id = category.id, name = %category.name, "Category stored in memory");
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> StoreResult<NotificationCategory> {
        let tables = self.tables.lock().await;
        tables
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                resource: "Notification category",
                id,
            })
    }

    async fn list_categories(&self) -> StoreResult<Vec<NotificationCategory>> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn rename_category(&self, id: i64, name: &str) -> StoreResult<NotificationCategory> {
        let mut tables = self.tables.lock().await;

        if !tables.categories.contains_key(&id) {
            return Err(StoreError::NotFound {
                resource: "Notification category",
                id,
            });
        }
        if !is_unique(tables.category_holding(name), Some(id)) {
            return Err(StoreError::Duplicate {
                field: UniqueField::CategoryName,
                value: name.to_string(),
            });
        }

        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                resource: "Notification category",
                id,
            })?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;

        if tables.categories.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                resource: "Notification category",
                id,
            });
        }

        let before = tables.notifications.len();
        tables.notifications.retain(|_, n| n.category_id != id);
        let cascaded = before - tables.notifications.len();

        tracing::debug!(
            category_id = id,
            cascaded_notifications = cascaded,
            "Category deleted from memory"
        );
        Ok(())
    }

    async fn category_notifications(&self, category_id: i64) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.lock().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.category_id == category_id)
            .map(|n| tables.join(n))
            .collect();
        notifications.sort_by(|a, b| a.message.cmp(&b.message));
        Ok(notifications)
    }

    async fn count_categories(&self) -> StoreResult<u64> {
        Ok(self.tables.lock().await.categories.len() as u64)
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<(Notification, CategoryResolution)> {
        let mut tables = self.tables.lock().await;

        // Reject before resolving so a duplicate never leaves a new category behind
        if !is_unique(tables.notification_holding(&notification.message), None) {
            return Err(StoreError::Duplicate {
                field: UniqueField::NotificationMessage,
                value: notification.message,
            });
        }

        let resolution = tables.resolve_category(&notification.category_name);

        tables.last_notification_id += 1;
        let row = NotificationRow {
            id: tables.last_notification_id,
            message: notification.message,
            ttl: notification.ttl,
            creation_date: Utc::now(),
            category_id: resolution.category().id,
            displayed_times: 0,
            displayed_once: false,
        };
        let stored = tables.join(&row);
        tables.notifications.insert(row.id, row);

        Ok((stored, resolution))
    }

    async fn get_notification(&self, id: i64) -> StoreResult<Notification> {
        let tables = self.tables.lock().await;
        tables
            .notifications
            .get(&id)
            .map(|row| tables.join(row))
            .ok_or(StoreError::NotFound {
                resource: "Notification",
                id,
            })
    }

    async fn list_notifications(&self, page: PageRequest) -> StoreResult<(Vec<Notification>, u64)> {
        let tables = self.tables.lock().await;
        let total = tables.notifications.len() as u64;
        let rows = page_of(tables.notifications.values(), page);
        Ok((rows.into_iter().map(|row| tables.join(row)).collect(), total))
    }

    async fn update_notification(&self, id: i64, patch: NotificationPatch) -> StoreResult<Notification> {
        let mut tables = self.tables.lock().await;

        let mut notification = tables
            .notifications
            .get(&id)
            .map(|row| tables.join(row))
            .ok_or(StoreError::NotFound {
                resource: "Notification",
                id,
            })?;

        if let Some(message) = &patch.message {
            if !is_unique(tables.notification_holding(message), Some(id)) {
                return Err(StoreError::Duplicate {
                    field: UniqueField::NotificationMessage,
                    value: message.clone(),
                });
            }
        }

        patch.apply_to(&mut notification);

        if let Some(row) = tables.notifications.get_mut(&id) {
            row.message = notification.message.clone();
            row.ttl = notification.ttl;
            row.displayed_times = notification.displayed_times;
            row.displayed_once = notification.displayed_once;
        }

        Ok(notification)
    }

    async fn delete_notification(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .notifications
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                resource: "Notification",
                id,
            })
    }

    async fn count_notifications(&self) -> StoreResult<u64> {
        Ok(self.tables.lock().await.notifications.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_notification(message: &str, category: &str) -> NewNotification {
        NewNotification {
            message: message.to_string(),
            ttl: 30,
            category_name: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_notification_creates_missing_category() {
        let store = MemoryStore::new();

        let (notification, resolution) = store
            .create_notification(new_notification("Backup finished", "Information"))
            .await
            .unwrap();

        assert!(resolution.was_created());
        assert_eq!(notification.category.name, "Information");
        assert_eq!(notification.displayed_times, 0);
        assert!(!notification.displayed_once);
        assert_eq!(store.count_categories().await.unwrap(), 1);

        let (_, resolution) = store
            .create_notification(new_notification("Backup started", "Information"))
            .await
            .unwrap();
        assert!(matches!(resolution, CategoryResolution::Found(_)));
        assert_eq!(store.count_categories().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_message_rejected_without_side_effects() {
        let store = MemoryStore::new();
        store
            .create_notification(new_notification("Backup finished", "Information"))
            .await
            .unwrap();

        let err = store
            .create_notification(new_notification("Backup finished", "Brand new"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Duplicate {
                field: UniqueField::NotificationMessage,
                ..
            }
        ));
        assert_eq!(store.count_notifications().await.unwrap(), 1);
        assert_eq!(store.count_categories().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_message() {
        let store = MemoryStore::new();
        let (first, _) = store
            .create_notification(new_notification("Backup finished", "Information"))
            .await
            .unwrap();
        store
            .create_notification(new_notification("Backup started", "Information"))
            .await
            .unwrap();

        let patch = NotificationPatch {
            message: Some("Backup finished".to_string()),
            ttl: Some(99),
            ..Default::default()
        };
        let updated = store.update_notification(first.id, patch).await.unwrap();
        assert_eq!(updated.ttl, 99);

        let stolen = NotificationPatch {
            message: Some("Backup started".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_notification(first.id, stolen).await,
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_rename_category_self_exclusion() {
        let store = MemoryStore::new();
        let error = store.create_category("Error").await.unwrap();
        store.create_category("Warning").await.unwrap();

        assert!(store.rename_category(error.id, "Error").await.is_ok());
        assert!(matches!(
            store.rename_category(error.id, "Warning").await,
            Err(StoreError::Duplicate {
                field: UniqueField::CategoryName,
                ..
            })
        ));

        let renamed = store.rename_category(error.id, "Critical").await.unwrap();
        assert_eq!(renamed.name, "Critical");
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let store = MemoryStore::new();
        let (a, _) = store
            .create_notification(new_notification("Disk almost full", "Warning"))
            .await
            .unwrap();
        store
            .create_notification(new_notification("CPU running hot", "Warning"))
            .await
            .unwrap();
        let (kept, _) = store
            .create_notification(new_notification("Backup finished", "Information"))
            .await
            .unwrap();

        store.delete_category(a.category.id).await.unwrap();

        assert_eq!(store.count_notifications().await.unwrap(), 1);
        assert!(store.get_notification(kept.id).await.is_ok());
        assert!(matches!(
            store.get_notification(a.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_pagination_slices() {
        let store = MemoryStore::new();
        for i in 0..6 {
            store
                .create_notification(new_notification(&format!("Message {}", i), "Information"))
                .await
                .unwrap();
        }

        let (page, total) = store
            .list_notifications(PageRequest::new(Some(2), 4))
            .await
            .unwrap();
        assert_eq!(total, 6);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].message, "Message 4");

        let (empty, _) = store
            .list_notifications(PageRequest::new(Some(5), 4))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_user_name() {
        let store = MemoryStore::new();
        store.create_user("testuser", "$argon2id$x").await.unwrap();
        assert!(matches!(
            store.create_user("testuser", "$argon2id$y").await,
            Err(StoreError::Duplicate {
                field: UniqueField::UserName,
                ..
            })
        ));
        assert!(store.find_user_by_name("testuser").await.unwrap().is_some());
        assert!(store.find_user_by_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = MemoryStore::new();
        let (first, _) = store
            .create_notification(new_notification("First message", "Information"))
            .await
            .unwrap();
        store.delete_notification(first.id).await.unwrap();
        let (second, _) = store
            .create_notification(new_notification("Second message", "Information"))
            .await
            .unwrap();
        assert!(second.id > first.id);
    }
}
