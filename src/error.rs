// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::routes::auth::LAUNCH_PATH;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Callback `state` did not match the nonce issued at launch.
    #[error("OAuth state mismatch")]
    InvalidState,

    #[error("Authentication required")]
    Unauthenticated,

    /// The provider rejected the stored access token.
    #[error("Spotify access token expired or revoked")]
    TokenExpired,

    #[error("Token exchange failed: {0}")]
    AuthExchange(String),

    #[error("Profile lookup failed: {0}")]
    ProfileFetch(String),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Spotify API error: {0}")]
    SpotifyApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Body returned for a callback whose `state` does not match.
    pub const INVALID_STATE_MESSAGE: &'static str = "Invalid Authenticity Key";

    /// HTTP status used when the error is rendered as a failure page.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidState => StatusCode::UNAUTHORIZED,
            AppError::Unauthenticated | AppError::TokenExpired => StatusCode::SEE_OTHER,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::AuthExchange(_) | AppError::ProfileFetch(_) | AppError::SpotifyApi(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::InvalidState => {
                tracing::warn!("Rejected OAuth callback with mismatched state");
                let body = ErrorResponse {
                    error: Self::INVALID_STATE_MESSAGE.to_string(),
                };
                return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
            }
            AppError::Unauthenticated | AppError::TokenExpired => {
                tracing::debug!(reason = %self, "Redirecting to Spotify authentication");
                return Redirect::to(LAUNCH_PATH).into_response();
            }
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::BadRequest(msg) => format!("Invalid request: {}", msg),
            AppError::AuthExchange(msg) => {
                tracing::error!(error = %msg, "Token exchange failed");
                "Could not complete sign-in with Spotify.".to_string()
            }
            AppError::ProfileFetch(msg) => {
                tracing::error!(error = %msg, "Profile lookup failed");
                "Could not read your Spotify profile.".to_string()
            }
            AppError::DuplicateUser(msg) => {
                tracing::warn!(spotify_id = %msg, "Concurrent user creation detected");
                "Your account is being set up by another request, please retry.".to_string()
            }
            AppError::SpotifyApi(msg) => {
                tracing::error!(error = %msg, "Spotify API error");
                "Spotify returned an error.".to_string()
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "Something went wrong on our side.".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Something went wrong on our side.".to_string()
            }
        };

        let status = self.status();
        (status, crate::views::error_page(status, &message)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_invalid_state_is_401_json() {
        let response = AppError::InvalidState.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_unauthenticated_redirects_to_launch() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), LAUNCH_PATH);

        let response = AppError::TokenExpired.into_response();
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), LAUNCH_PATH);
    }

    #[test]
    fn test_failure_pages_use_mapped_status() {
        let cases = [
            (AppError::NotFound("track".into()), StatusCode::NOT_FOUND),
            (AppError::AuthExchange("boom".into()), StatusCode::BAD_GATEWAY),
            (AppError::ProfileFetch("boom".into()), StatusCode::BAD_GATEWAY),
            (AppError::DuplicateUser("abc".into()), StatusCode::CONFLICT),
            (AppError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert!(response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html"));
        }
    }
}
