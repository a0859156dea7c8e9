// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Spotify Insights: audio-feature views over a Spotify library
//!
//! This crate signs users in with Spotify (OAuth authorization code flow),
//! keeps a local user record per Spotify account, and renders track and
//! library analysis pages from the Spotify Web API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod views;

use config::Config;
use db::UserStore;
use services::{SessionManager, SpotifyClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserStore,
    pub spotify: SpotifyClient,
    pub sessions: SessionManager,
}

impl AppState {
    /// Wire up services from config around an already opened user store.
    pub fn new(config: Config, users: UserStore) -> Self {
        let spotify = SpotifyClient::new(&config);
        let sessions = SessionManager::new(&config.session_signing_key);
        Self {
            config,
            users,
            spotify,
            sessions,
        }
    }
}
