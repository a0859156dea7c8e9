// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::json;
use spotify_insights::config::Config;
use spotify_insights::db::{FirestoreDb, UserStore};
use spotify_insights::routes::create_router;
use spotify_insights::services::spotify::{Profile, TokenSet};
use spotify_insights::AppState;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Config pointing both Spotify hosts at the mock server.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        spotify_accounts_url: server.uri(),
        spotify_api_url: format!("{}/v1", server.uri()),
        ..Config::test_default()
    }
}

/// Create a test app backed by the in-memory store and a mock Spotify.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(test_config(server), UserStore::in_memory()));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_profile(spotify_id: &str) -> Profile {
    Profile {
        display_name: "Test User".to_string(),
        spotify_id: spotify_id.to_string(),
        email: Some("test@example.com".to_string()),
        country: Some("US".to_string()),
        product: Some("premium".to_string()),
        followers: 3,
    }
}

#[allow(dead_code)]
pub fn test_tokens(access_token: &str) -> TokenSet {
    TokenSet {
        access_token: access_token.to_string(),
        refresh_token: format!("{access_token}-refresh"),
        expires_in: 3600,
        scope: "user-read-private user-read-email user-library-read".to_string(),
    }
}

/// Store a user with `access_token` and return a `Cookie` header value
/// carrying a valid session for them.
#[allow(dead_code)]
pub async fn signed_in_cookie(state: &AppState, spotify_id: &str, access_token: &str) -> String {
    let mut user = state.users.create_user(&test_profile(spotify_id)).await.unwrap();
    state
        .users
        .save_credentials(&mut user, &test_tokens(access_token))
        .await
        .unwrap();
    format!("session={}", state.sessions.login(&user).unwrap())
}

/// Token endpoint answering `code` with `access_token`.
#[allow(dead_code)]
pub async fn mount_token_exchange(server: &MockServer, code: &str, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains(format!("code={code}")))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "scope": "user-read-private user-read-email user-library-read",
            "expires_in": 3600,
            "refresh_token": format!("{access_token}-refresh")
        })))
        .mount(server)
        .await;
}

/// `/me` endpoint for the holder of `access_token`.
#[allow(dead_code)]
pub async fn mount_profile(server: &MockServer, access_token: &str, spotify_id: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header_eq("authorization", format!("Bearer {access_token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": spotify_id,
            "display_name": "Test User",
            "email": "test@example.com",
            "country": "US",
            "product": "premium",
            "followers": { "href": null, "total": 3 }
        })))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Full `Set-Cookie` header for `name`, if the response sets it.
#[allow(dead_code)]
pub fn find_cookie(response: &Response, name: &str) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with(&format!("{name}=")))
}

/// Value part of a `Set-Cookie` header.
#[allow(dead_code)]
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
