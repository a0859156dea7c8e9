// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pages for signed-in users.
//!
//! The session guard is applied in routes/mod.rs; every handler here can
//! rely on a [`CurrentUser`] extension.

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::views;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(my_profile))
        .route("/search", get(song_search))
        .route("/track/{spotify_id}", get(song_info))
        .route("/library", get(my_library))
        .route("/library/filter", post(filter_library))
}

/// Current user's Spotify profile.
async fn my_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Html<String>> {
    let profile = state
        .spotify
        .fetch_current_profile(user.access_token()?)
        .await?;

    Ok(views::profile_page(&user, &profile))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    search_query: String,
}

/// Search for a song and redirect to its analysis page (first hit only).
async fn song_search(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<SearchParams>,
) -> Result<Redirect> {
    let track = state
        .spotify
        .search_track(user.access_token()?, &params.search_query)
        .await?;

    tracing::debug!(track_id = %track.id, "Search hit");
    Ok(Redirect::to(&format!(
        "/track/{}",
        urlencoding::encode(&track.id)
    )))
}

/// Audio-feature breakdown for one track.
async fn song_info(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(spotify_id): Path<String>,
) -> Result<Html<String>> {
    let track = state
        .spotify
        .get_track_by_id(user.access_token()?, &spotify_id)
        .await?;

    Ok(views::track_page(&track))
}

/// Saved library with aggregate statistics.
async fn my_library(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Html<String>> {
    let library = state
        .spotify
        .get_saved_library(user.access_token()?)
        .await?;

    Ok(views::library_page(&library, None))
}

#[derive(Deserialize)]
pub struct FilterParams {
    query_str: Option<String>,
}

/// Saved library narrowed to tracks matching `query_str`.
///
/// The query is read from the URL, or from the form body when the URL
/// carries none.
async fn filter_library(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<FilterParams>,
    form: std::result::Result<Form<FilterParams>, FormRejection>,
) -> Result<Html<String>> {
    let query = match (params.query_str, form) {
        (Some(query), _) => query,
        (None, Ok(Form(body))) => body.query_str.unwrap_or_default(),
        (None, Err(rejection)) => {
            tracing::debug!(error = %rejection, "No filter form body");
            String::new()
        }
    };

    let library = state
        .spotify
        .get_saved_library(user.access_token()?)
        .await?;
    let filtered = library.filter_by_query(&query);

    tracing::debug!(
        total = library.len(),
        matched = filtered.len(),
        "Library filtered"
    );

    Ok(views::library_page(&filtered, Some(&query)))
}
