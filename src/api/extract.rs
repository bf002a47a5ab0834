//! Request extractors shared by the resource handlers.

use std::convert::Infallible;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts},
};

use crate::config::ServerConfig;
use crate::domain::ResourceUrls;
use crate::error::AppError;
use crate::server::AppState;

use super::routes::API_PREFIX;

/// JSON body extractor whose rejections become 400 validation errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor for numeric resource ids.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl FromRequestParts<AppState> for ResourceUrls {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let origin = match &state.settings.server.public_url {
            Some(public_url) => public_url.trim_end_matches('/').to_string(),
            None => {
                let host = parts
                    .headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
                    .unwrap_or_else(|| bind_authority(&state.settings.server));
                format!("http://{}", host)
            }
        };

        Ok(ResourceUrls::new(format!("{}{}", origin, API_PREFIX)))
    }
}

/// Authority for links when neither `public_url` nor `Host` is available.
/// A wildcard bind address is not reachable, so it becomes `localhost`.
fn bind_authority(server: &ServerConfig) -> String {
    let host = match server.host.as_str() {
        "0.0.0.0" | "::" | "[::]" => "localhost",
        host => host,
    };
    format!("{}:{}", host, server.port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_bind_links_to_localhost() {
        let mut server = ServerConfig::default();
        assert_eq!(bind_authority(&server), "localhost:8081");

        server.host = "10.0.0.7".to_string();
        server.port = 9000;
        assert_eq!(bind_authority(&server), "10.0.0.7:9000");
    }
}
