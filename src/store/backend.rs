//! Backend trait for notification storage.
//!
//! This module defines the abstraction layer for persistence backends,
//! allowing different storage implementations (PostgreSQL, memory) to be
//! used interchangeably by the HTTP layer.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewNotification, Notification, NotificationCategory, NotificationPatch, PageRequest, User};

use super::uniqueness::UniqueField;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column already holds the value on another row
    #[error("The {field} '{value}' is already in use")]
    Duplicate { field: UniqueField, value: String },

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of resolving a category by name while writing a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryResolution {
    /// The category already existed
    Found(NotificationCategory),
    /// The category was created by this write
    Created(NotificationCategory),
}

impl CategoryResolution {
    pub fn category(&self) -> &NotificationCategory {
        match self {
            CategoryResolution::Found(category) | CategoryResolution::Created(category) => category,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, CategoryResolution::Created(_))
    }
}

/// Storage for users, notification categories and notifications.
///
/// # Atomicity
///
/// Every write runs its uniqueness checks and the write itself as one
/// unit (a database transaction, or a single lock acquisition). A unique
/// constraint violation reported by the storage itself is surfaced as
/// `StoreError::Duplicate` as well.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) as they are shared
/// across all request handlers.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Backend type identifier ("postgres", "memory")
    fn backend_type(&self) -> &'static str;

    // ----- users -----

    /// Store a user whose password has already been hashed.
    async fn create_user(&self, name: &str, password_hash: &str) -> StoreResult<User>;

    async fn get_user(&self, id: i64) -> StoreResult<User>;

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    /// One page of users ordered by id, plus the total count.
    async fn list_users(&self, page: PageRequest) -> StoreResult<(Vec<User>, u64)>;

    // ----- categories -----

    async fn create_category(&self, name: &str) -> StoreResult<NotificationCategory>;

    async fn get_category(&self, id: i64) -> StoreResult<NotificationCategory>;

    /// All categories ordered by id.
    async fn list_categories(&self) -> StoreResult<Vec<NotificationCategory>>;

    async fn rename_category(&self, id: i64, name: &str) -> StoreResult<NotificationCategory>;

    /// Delete a category together with all of its notifications.
    async fn delete_category(&self, id: i64) -> StoreResult<()>;

    /// Notifications of one category ordered by message.
    async fn category_notifications(&self, category_id: i64) -> StoreResult<Vec<Notification>>;

    async fn count_categories(&self) -> StoreResult<u64>;

    // ----- notifications -----

    /// Store a notification, finding or creating its category by name.
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<(Notification, CategoryResolution)>;

    async fn get_notification(&self, id: i64) -> StoreResult<Notification>;

    /// One page of notifications ordered by id, plus the total count.
    async fn list_notifications(&self, page: PageRequest) -> StoreResult<(Vec<Notification>, u64)>;

    /// Apply the present fields of `patch`; the rest are left untouched.
    async fn update_notification(&self, id: i64, patch: NotificationPatch) -> StoreResult<Notification>;

    async fn delete_notification(&self, id: i64) -> StoreResult<()>;

    async fn count_notifications(&self) -> StoreResult<u64>;
}
