//! User endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::auth::{hash_password, validate_password_strength, AuthenticatedUser};
use crate::domain::{
    validate::validate_user_name, CreateUserRequest, Page, PageQuery, PageRequest, ResourceUrls,
    UserResource,
};
use crate::error::{AppError, Result};
use crate::metrics::ResourceMetrics;
use crate::server::AppState;

use super::extract::{AppJson, AppPath, AppQuery};

/// POST /service/users/ - Register a user (no credentials required)
#[tracing::instrument(name = "http.create_user", skip(state, urls, request), fields(user = %request.name))]
pub async fn create_user(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResource>)> {
    validate_user_name(&request.name)?;
    validate_password_strength(&request.password)?;

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

    let user = state.store.create_user(&request.name, &password_hash).await?;
    ResourceMetrics::record_user_created();
    tracing::info!(user_id = user.id, "User created");

    Ok((StatusCode::CREATED, Json(UserResource::new(user, &urls))))
}

/// GET /service/users/ - Paginated list of users
#[tracing::instrument(name = "http.list_users", skip(state, urls, caller), fields(caller = %caller.name))]
pub async fn list_users(
    State(state): State<AppState>,
    urls: ResourceUrls,
    Extension(caller): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<Page<UserResource>>> {
    let request = PageRequest::from_query(&query, state.settings.pagination.page_size)?;
    let (users, total) = state.store.list_users(request).await?;

    let results = users
        .into_iter()
        .map(|user| UserResource::new(user, &urls))
        .collect();

    Ok(Json(Page::new(results, total, request, &urls.users())))
}

/// GET /service/users/{id}
#[tracing::instrument(name = "http.get_user", skip(state, urls))]
pub async fn get_user(
    State(state): State<AppState>,
    urls: ResourceUrls,
    AppPath(id): AppPath<i64>,
) -> Result<Json<UserResource>> {
    let user = state.store.get_user(id).await?;
    Ok(Json(UserResource::new(user, &urls)))
}
