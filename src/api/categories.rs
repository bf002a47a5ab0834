//! Notification category endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::domain::{
    validate::validate_category_name, CategoryPatch, CategoryResource, CreateCategoryRequest,
    NotificationCategory, ResourceUrls,
};
use crate::error::Result;
use crate::metrics::ResourceMetrics;
use crate::server::AppState;
use crate::telemetry::{attributes, record_attribute};

use super::extract::{AppJson, AppPath};

/// Load a category's notifications and build its representation.
async fn category_resource(
    state: &AppState,
    urls: &ResourceUrls,
    category: NotificationCategory,
) -> Result<CategoryResource> {
    let notifications = state.store.category_notifications(category.id).await?;
    Ok(CategoryResource::new(category, notifications, urls))
}

/// GET /service/notification_categories/ - All categories with their notifications
#[tracing::instrument(name = "http.list_categories", skip(state, urls))]
pub async fn list_categories(
    State(state): State<AppState>,
    urls: ResourceUrls,
) -> Result<Json<Vec<CategoryResource>>> {
    let categories = state.store.list_categories().await?;

    let mut resources = Vec::with_capacity(categories.len());
    for category in categories {
        resources.push(category_resource(&state, &urls, category).await?);
    }

    Ok(Json(resources))
}

/// POST /service/notification_categories/
#[tracing::instrument(
    name = "http.create_category",
    skip(state, urls, request),
    fields(category = %request.name)
)]
pub async fn create_category(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppJson(request): AppJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResource>)> {
    validate_category_name(&request.name)?;

    let category = state.store.create_category(&request.name).await?;
    ResourceMetrics::record_category_created();
    record_attribute(attributes::category_id(category.id));
    tracing::info!(category_id = category.id, "Notification category created");

    Ok((
        StatusCode::CREATED,
        Json(CategoryResource::new(category, Vec::new(), &urls)),
    ))
}

/// GET /service/notification_categories/{id}
#[tracing::instrument(name = "http.get_category", skip(state, urls))]
pub async fn get_category(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppPath(id): AppPath<i64>,
) -> Result<Json<CategoryResource>> {
    let category = state.store.get_category(id).await?;
    Ok(Json(category_resource(&state, &urls, category).await?))
}

/// PATCH /service/notification_categories/{id} - Rename a category
#[tracing::instrument(name = "http.update_category", skip(state, urls, patch))]
pub async fn update_category(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<CategoryPatch>,
) -> Result<Json<CategoryResource>> {
    let category = match patch.name {
        Some(name) => {
            validate_category_name(&name)?;
            record_attribute(attributes::category_name(&name));
            state.store.rename_category(id, &name).await?
        }
        None => state.store.get_category(id).await?,
    };

    Ok(Json(category_resource(&state, &urls, category).await?))
}

/// DELETE /service/notification_categories/{id} - Also deletes its notifications
#[tracing::instrument(name = "http.delete_category", skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode> {
    state.store.delete_category(id).await?;
    ResourceMetrics::record_deleted("category");
    tracing::info!(category_id = id, "Notification category deleted");

    Ok(StatusCode::NO_CONTENT)
}
