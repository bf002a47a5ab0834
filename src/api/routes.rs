use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::middleware::basic_auth;
use crate::server::AppState;

use super::categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::notifications::{
    create_notification, delete_notification, get_notification, list_notifications,
    update_notification,
};
use super::users::{create_user, get_user, list_users};

/// Mount point of the resource API
pub const API_PREFIX: &str = "/service";

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Everything below requires HTTP Basic credentials
    let protected = Router::new()
        .route("/users/", get(list_users))
        .route("/users/{id}", get(get_user))
        .route(
            "/notification_categories/",
            get(list_categories).post(create_category),
        )
        .route(
            "/notification_categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route(
            "/notifications/",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/notifications/{id}",
            get(get_notification)
                .patch(update_notification)
                .delete(delete_notification),
        )
        .route_layer(middleware::from_fn_with_state(state, basic_auth));

    // Registration is open
    let public = Router::new().route("/users/", post(create_user));

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(API_PREFIX, protected.merge(public))
}
