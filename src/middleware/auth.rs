// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard for routes that need a signed-in user.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Authenticated user resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid session.
///
/// Without one the request is redirected to the Spotify launch route and
/// the handler never runs.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthenticated)?;

    let user = state.sessions.current_user(&state.users, &token).await?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
