// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User storage.
//!
//! Users are keyed by their Spotify ID, so uniqueness is enforced by the
//! backend at insert time rather than by a read-then-write check.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::models::{StoredTokens, User};
use crate::services::spotify::{Profile, TokenSet};
use crate::time_utils::format_utc_rfc3339;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

/// User store handle shared by all requests.
#[derive(Clone)]
pub struct UserStore {
    backend: Backend,
}

impl UserStore {
    pub fn firestore(db: FirestoreDb) -> Self {
        Self {
            backend: Backend::Firestore(db),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryDb::default()),
        }
    }

    /// Look up a returning user by Spotify ID.
    pub async fn find_user_by_provider_id(&self, spotify_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_user(spotify_id).await,
            Backend::Memory(db) => Ok(db.get_user(spotify_id)),
        }
    }

    /// Look up a user by local ID.
    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_user_by_local_id(user_id).await,
            Backend::Memory(db) => Ok(db.get_user_by_local_id(user_id)),
        }
    }

    /// Create a user from a freshly resolved profile.
    ///
    /// Fails with [`AppError::DuplicateUser`] when a user with the same
    /// Spotify ID already exists.
    pub async fn create_user(&self, profile: &Profile) -> Result<User, AppError> {
        let now = format_utc_rfc3339(Utc::now());
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            display_name: profile.display_name.clone(),
            spotify_id: profile.spotify_id.clone(),
            email: profile.email.clone(),
            tokens: None,
            created_at: now.clone(),
            last_login: now,
        };

        match &self.backend {
            Backend::Firestore(db) => db.insert_user(&user).await?,
            Backend::Memory(db) => db.insert_user(&user)?,
        }

        tracing::info!(user_id = %user.id, spotify_id = %user.spotify_id, "Created user");
        Ok(user)
    }

    /// Overwrite the stored credentials for `user` and record the login.
    pub async fn save_credentials(&self, user: &mut User, tokens: &TokenSet) -> Result<(), AppError> {
        let now = Utc::now();
        let expires_at = i64::try_from(tokens.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now);

        user.tokens = Some(StoredTokens {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: format_utc_rfc3339(expires_at),
            scope: tokens.scope.clone(),
        });
        user.last_login = format_utc_rfc3339(now);

        match &self.backend {
            Backend::Firestore(db) => db.update_user(user).await,
            Backend::Memory(db) => {
                db.update_user(user);
                Ok(())
            }
        }
    }
}
