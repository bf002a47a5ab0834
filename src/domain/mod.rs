//! Domain layer modules
//!
//! This module contains business domain logic:
//! - `models`: Users, notification categories, notifications and write requests
//! - `validate`: Field validation for incoming writes
//! - `pagination`: Page arithmetic and previous/next links
//! - `resources`: JSON representations with hyperlinks

pub mod models;
pub mod pagination;
pub mod resources;
pub mod validate;

pub use models::{
    CategoryPatch, CategoryReference, CreateCategoryRequest, CreateNotificationRequest,
    CreateUserRequest, NewNotification, Notification, NotificationCategory, NotificationPatch,
    User,
};
pub use pagination::{Page, PageQuery, PageRequest};
pub use resources::{CategoryResource, NotificationResource, ResourceUrls, UserResource};
pub use validate::ValidationError;
