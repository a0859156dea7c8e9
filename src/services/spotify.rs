// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify client for the OAuth authorization-code flow and the Web API.
//!
//! Handles:
//! - Authorization URL construction
//! - Code-for-token exchange
//! - Current-user profile lookup
//! - Track lookup, search, saved library and audio features

use serde::Deserialize;
use validator::Validate;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AudioFeatures, Track, TrackCollection};

/// Page size for `GET /me/tracks` (Spotify maximum).
const SAVED_TRACKS_PAGE_SIZE: u32 = 50;

/// Upper bound on saved-track pages fetched per request.
const MAX_LIBRARY_PAGES: u32 = 20;

/// Maximum ids per `GET /audio-features` call.
const AUDIO_FEATURES_BATCH: usize = 100;

/// Build the Spotify consent-page URL. Every value is percent-encoded.
pub fn build_authorization_url(
    accounts_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> String {
    format!(
        "{}/authorize?\
         client_id={}&\
         response_type=code&\
         redirect_uri={}&\
         scope={}&\
         state={}",
        accounts_url.trim_end_matches('/'),
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(scope),
        urlencoding::encode(state)
    )
}

/// Spotify API client.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyClient {
    /// Create a new Spotify client with OAuth credentials and endpoints from config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            accounts_url: config.spotify_accounts_url.trim_end_matches('/').to_string(),
            api_url: config.spotify_api_url.trim_end_matches('/').to_string(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        }
    }

    /// Consent-page URL for this client's credentials.
    pub fn authorization_url(&self, redirect_uri: &str, scope: &str, state: &str) -> String {
        build_authorization_url(
            &self.accounts_url,
            &self.client_id,
            redirect_uri,
            scope,
            state,
        )
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// Exchange an authorization code for access and refresh tokens.
    ///
    /// Single request, no retry. Any non-success status or a body missing a
    /// required field is an [`AppError::AuthExchange`].
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenSet, AppError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Spotify token exchange failed");
            return Err(AppError::AuthExchange(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        let tokens: TokenSet = response
            .json()
            .await
            .map_err(|e| AppError::AuthExchange(format!("Failed to parse token response: {}", e)))?;

        tokens
            .validate()
            .map_err(|e| AppError::AuthExchange(format!("Invalid token response: {}", e)))?;

        Ok(tokens)
    }

    /// Get the profile of the user owning `access_token`.
    ///
    /// A 401 is reported as [`AppError::TokenExpired`]; every other failure
    /// as [`AppError::ProfileFetch`].
    pub async fn fetch_current_profile(&self, access_token: &str) -> Result<Profile, AppError> {
        let response = self
            .http
            .get(format!("{}/me", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ProfileFetch(format!("Profile request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            if status.as_u16() == 401 {
                return Err(AppError::TokenExpired);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ProfileFetch(format!("HTTP {}: {}", status, body)));
        }

        let me: SpotifyUser = response
            .json()
            .await
            .map_err(|e| AppError::ProfileFetch(format!("JSON parse error: {}", e)))?;

        me.validate()
            .map_err(|e| AppError::ProfileFetch(format!("Invalid profile: {}", e)))?;

        Ok(me.into())
    }

    // ─── Tracks ──────────────────────────────────────────────────────────────

    /// First track matching `query`, without audio features.
    pub async fn search_track(&self, access_token: &str, query: &str) -> Result<Track, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query is empty".to_string()));
        }

        let url = format!("{}/search", self.api_url);
        let result: SearchResponse = self
            .get_json(
                &url,
                access_token,
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        result
            .tracks
            .items
            .into_iter()
            .find_map(SpotifyTrack::into_track)
            .ok_or_else(|| AppError::NotFound(format!("No track matches '{}'", query)))
    }

    /// Get a track by ID, with its audio features attached.
    pub async fn get_track_by_id(&self, access_token: &str, track_id: &str) -> Result<Track, AppError> {
        let url = format!("{}/tracks/{}", self.api_url, urlencoding::encode(track_id));
        let track: SpotifyTrack = self.get_json(&url, access_token, &[]).await?;

        let mut track = track
            .into_track()
            .ok_or_else(|| AppError::NotFound(format!("Track {}", track_id)))?;

        track.audio_features = self
            .audio_features(access_token, &[track.id.as_str()])
            .await?
            .into_iter()
            .next()
            .flatten();

        Ok(track)
    }

    /// The user's saved tracks, most recently saved first, with audio features.
    pub async fn get_saved_library(&self, access_token: &str) -> Result<TrackCollection, AppError> {
        let url = format!("{}/me/tracks", self.api_url);
        let mut tracks = Vec::new();

        for page in 0..MAX_LIBRARY_PAGES {
            let offset = page * SAVED_TRACKS_PAGE_SIZE;
            let saved: SavedTracksPage = self
                .get_json(
                    &url,
                    access_token,
                    &[
                        ("limit", SAVED_TRACKS_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let last_page = saved.next.is_none();
            tracks.extend(
                saved
                    .items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .filter_map(SpotifyTrack::into_track),
            );

            if last_page {
                break;
            }
            if page + 1 == MAX_LIBRARY_PAGES {
                tracing::warn!(
                    fetched = tracks.len(),
                    "Saved library truncated at page limit"
                );
            }
        }

        for chunk in tracks.chunks_mut(AUDIO_FEATURES_BATCH) {
            let ids: Vec<&str> = chunk.iter().map(|t| t.id.as_str()).collect();
            let features = self.audio_features(access_token, &ids).await?;
            for (track, features) in chunk.iter_mut().zip(features) {
                track.audio_features = features;
            }
        }

        tracing::debug!(count = tracks.len(), "Saved library fetched");
        Ok(TrackCollection::new(tracks))
    }

    /// Audio features for up to 100 tracks, in the order of `ids`.
    async fn audio_features(
        &self,
        access_token: &str,
        ids: &[&str],
    ) -> Result<Vec<Option<AudioFeatures>>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/audio-features", self.api_url);
        let response: AudioFeaturesResponse = self
            .get_json(&url, access_token, &[("ids", ids.join(","))])
            .await?;

        Ok(response.audio_features)
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::SpotifyApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let path = response.url().path().to_string();
            let body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 => AppError::TokenExpired,
                404 => AppError::NotFound(path),
                429 => {
                    tracing::warn!("Spotify rate limit hit (429)");
                    AppError::SpotifyApi(format!("HTTP {}", status))
                }
                _ => AppError::SpotifyApi(format!("HTTP {}: {}", status, body)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::SpotifyApi(format!("JSON parse error: {}", e)))
    }
}

/// Token response from the Spotify accounts service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenSet {
    #[validate(length(min = 1))]
    pub access_token: String,
    #[validate(length(min = 1))]
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
}

/// Identity fields from `GET /me`.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub display_name: String,
    pub spotify_id: String,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub followers: u64,
}

#[derive(Debug, Deserialize, Validate)]
struct SpotifyUser {
    #[validate(length(min = 1))]
    id: String,
    display_name: Option<String>,
    #[validate(email)]
    email: Option<String>,
    country: Option<String>,
    product: Option<String>,
    followers: Option<SpotifyFollowers>,
}

#[derive(Debug, Deserialize)]
struct SpotifyFollowers {
    total: u64,
}

impl From<SpotifyUser> for Profile {
    fn from(me: SpotifyUser) -> Self {
        Self {
            display_name: me
                .display_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| me.id.clone()),
            spotify_id: me.id,
            email: me.email,
            country: me.country,
            product: me.product,
            followers: me.followers.map(|f| f.total).unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    /// Null for local files
    id: Option<String>,
    name: String,
    #[serde(default)]
    popularity: u32,
    album: SpotifyAlbum,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
}

impl SpotifyTrack {
    fn into_track(self) -> Option<Track> {
        Some(Track {
            id: self.id?,
            name: self.name,
            album_name: self.album.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            popularity: self.popularity,
            audio_features: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: SearchTracks,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SavedTracksPage {
    #[serde(default)]
    items: Vec<SavedTrackItem>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SavedTrackItem {
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    #[serde(default)]
    audio_features: Vec<Option<AudioFeatures>>,
}
