//! API layer - HTTP endpoint handlers organized by resource.

mod categories;
mod extract;
mod health;
mod metrics;
mod notifications;
mod routes;
mod users;

// Re-export handlers for use in server/app.rs
pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use extract::{AppJson, AppPath, AppQuery};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use notifications::{
    create_notification, delete_notification, get_notification, list_notifications,
    update_notification,
};
pub use routes::{api_routes, API_PREFIX};
pub use users::{create_user, get_user, list_users};
