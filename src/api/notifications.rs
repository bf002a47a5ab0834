//! Notification endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::domain::{
    CreateNotificationRequest, NotificationPatch, NotificationResource, Page, PageQuery,
    PageRequest, ResourceUrls,
};
use crate::error::Result;
use crate::metrics::ResourceMetrics;
use crate::server::AppState;
use crate::telemetry::{attributes, record_attribute};

use super::extract::{AppJson, AppPath, AppQuery};

/// POST /service/notifications/ - Create a notification, creating its category if needed
#[tracing::instrument(
    name = "http.create_notification",
    skip(state, urls, request),
    fields(category = %request.notification_category.name())
)]
pub async fn create_notification(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppJson(request): AppJson<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResource>)> {
    let new = request.validate()?;

    let (notification, resolution) = state.store.create_notification(new).await?;
    ResourceMetrics::record_notification_created();
    record_attribute(attributes::notification_id(notification.id));
    record_attribute(attributes::category_id(notification.category.id));
    if resolution.was_created() {
        ResourceMetrics::record_category_implicitly_created();
        tracing::info!(
            category_id = resolution.category().id,
            category = %resolution.category().name,
            "Notification category created implicitly"
        );
    }
    tracing::info!(notification_id = notification.id, "Notification created");

    Ok((
        StatusCode::CREATED,
        Json(NotificationResource::new(notification, &urls)),
    ))
}

/// GET /service/notifications/?page=n
#[tracing::instrument(name = "http.list_notifications", skip(state, urls))]
pub async fn list_notifications(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Page<NotificationResource>>> {
    let request = PageRequest::from_query(&query, state.settings.pagination.page_size)?;
    let (notifications, total) = state.store.list_notifications(request).await?;

    let results = notifications
        .into_iter()
        .map(|n| NotificationResource::new(n, &urls))
        .collect();

    Ok(Json(Page::new(results, total, request, &urls.notifications())))
}

/// GET /service/notifications/{id}
#[tracing::instrument(name = "http.get_notification", skip(state, urls))]
pub async fn get_notification(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppPath(id): AppPath<i64>,
) -> Result<Json<NotificationResource>> {
    let notification = state.store.get_notification(id).await?;
    Ok(Json(NotificationResource::new(notification, &urls)))
}

/// PATCH /service/notifications/{id} - Partial update
#[tracing::instrument(name = "http.update_notification", skip(state, urls, patch))]
pub async fn update_notification(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<NotificationPatch>,
) -> Result<Json<NotificationResource>> {
    patch.validate()?;

    let notification = if patch.is_empty() {
        state.store.get_notification(id).await?
    } else {
        let updated = state.store.update_notification(id, patch).await?;
        tracing::debug!(notification_id = id, "Notification updated");
        updated
    };

    Ok(Json(NotificationResource::new(notification, &urls)))
}

/// DELETE /service/notifications/{id}
#[tracing::instrument(name = "http.delete_notification", skip(state))]
pub async fn delete_notification(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode> {
    state.store.delete_notification(id).await?;
    ResourceMetrics::record_deleted("notification");
    tracing::info!(notification_id = id, "Notification deleted");

    Ok(StatusCode::NO_CONTENT)
}
