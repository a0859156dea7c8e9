// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Local user record, keyed in storage by the Spotify user ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Local identifier (UUID v4), carried by the session token
    pub id: String,
    pub display_name: String,
    /// Spotify user ID (unique, also used as document ID)
    pub spotify_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Latest OAuth credentials, absent until the first login completes
    #[serde(default)]
    pub tokens: Option<StoredTokens>,
    /// When user first connected
    pub created_at: String,
    /// Last successful login
    pub last_login: String,
}

impl User {
    /// Access token for calls made on the user's behalf.
    pub fn access_token(&self) -> Result<&str, AppError> {
        self.tokens
            .as_ref()
            .map(|t| t.access_token.as_str())
            .ok_or(AppError::Unauthenticated)
    }
}

/// User's OAuth tokens as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires (ISO 8601)
    pub expires_at: String,
    /// Granted OAuth scopes (space separated)
    pub scope: String,
}
