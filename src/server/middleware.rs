use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::auth::{verify_password, verify_unknown_user, AuthenticatedUser, BasicCredentials};
use crate::error::AppError;
use crate::metrics::AuthMetrics;
use crate::telemetry::{attributes, record_attribute};

/// HTTP Basic authentication middleware.
///
/// Resolves the credentials against stored users and verifies the password
/// hash. On success the `AuthenticatedUser` is placed in request extensions.
pub async fn basic_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(authorization) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        AuthMetrics::record_missing_credentials();
        return Err(AppError::Auth("Authentication required".to_string()));
    };

    let credentials = BasicCredentials::from_header(authorization)
        .inspect_err(|_| AuthMetrics::record_malformed_credentials())?;

    let Some(user) = state.store.find_user_by_name(&credentials.username).await? else {
        let password = credentials.password;
        let _ = tokio::task::spawn_blocking(move || verify_unknown_user(&password)).await;
        AuthMetrics::record_unknown_user();
        tracing::warn!(username = %credentials.username, "Basic auth for unknown user");
        return Err(AppError::Auth("Invalid credentials".to_string()));
    };

    let password_hash = user.password_hash.clone();
    let password = credentials.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))??;

    if !verified {
        AuthMetrics::record_wrong_password();
        tracing::warn!(username = %user.name, "Basic auth with wrong password");
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    record_attribute(attributes::user_name(&user.name));
    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        name: user.name,
    });

    Ok(next.run(req).await)
}
