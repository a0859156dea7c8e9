// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify OAuth authentication routes.
//!
//! Flow: `Anonymous` → launch (nonce cookie set, redirect to consent page)
//! → callback. A callback whose `state` does not match the nonce goes back
//! to `Anonymous` with a 401 before any token exchange. Otherwise the code
//! is exchanged and the user resolved; success sets the session cookie,
//! failure renders an error page.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::SPOTIFY_SCOPE;
use crate::error::{AppError, Result};
use crate::middleware::auth::SESSION_COOKIE;
use crate::services::accounts;
use crate::services::session::SESSION_TTL_SECS;
use crate::AppState;

/// Route that starts the OAuth flow; unauthenticated users land here.
pub const LAUNCH_PATH: &str = "/launch_spotify_authentication";

/// OAuth redirect target registered with Spotify.
pub const CALLBACK_PATH: &str = "/spotify_auth_landing/";

/// Cookie carrying the CSRF nonce between launch and callback.
pub const STATE_COOKIE: &str = "spotify_auth_state";

const STATE_COOKIE_TTL_MINUTES: i64 = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(LAUNCH_PATH, get(launch))
        .route(CALLBACK_PATH, get(landing))
        .route("/logout", get(logout))
}

/// Start OAuth flow - redirect to Spotify authorization.
async fn launch(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<(CookieJar, Redirect)> {
    let nonce = generate_state_nonce()?;

    let auth_url = state
        .spotify
        .authorization_url(&state.config.redirect_uri(), SPOTIFY_SCOPE, &nonce);

    let cookie = Cookie::build((STATE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies())
        .max_age(time::Duration::minutes(STATE_COOKIE_TTL_MINUTES));

    tracing::info!(
        client_id = %state.config.spotify_client_id,
        "Starting OAuth flow, redirecting to Spotify"
    );

    Ok((jar.add(cookie), Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - verify state, exchange code for tokens, create session.
async fn landing(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if !state_matches(params.state.as_deref(), expected.as_deref()) {
        return Err(AppError::InvalidState);
    }

    let jar = jar.remove(Cookie::build(STATE_COOKIE).path(CALLBACK_PATH));

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Spotify");
        return Err(AppError::AuthExchange(format!(
            "Authorization was not granted: {}",
            error
        )));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::AuthExchange("Callback without authorization code".to_string()))?;

    let user = accounts::complete_login(
        &state.spotify,
        &state.users,
        &code,
        &state.config.redirect_uri(),
    )
    .await?;

    let session_token = state.sessions.login(&user)?;

    let cookie = Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies())
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));

    tracing::info!(user_id = %user.id, "Session established");

    Ok((jar.add(cookie), Redirect::to("/profile")))
}

/// Logout - drop the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/"),
    )
}

/// 32 random bytes, URL-safe base64.
fn generate_state_nonce() -> Result<String> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System random number generator failed")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Constant-time comparison of the returned `state` with the issued nonce.
fn state_matches(received: Option<&str>, expected: Option<&str>) -> bool {
    match (received, expected) {
        (Some(received), Some(expected)) if !expected.is_empty() => {
            received.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}
