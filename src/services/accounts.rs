// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login completion: token exchange, profile lookup and user resolution.

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::User;
use crate::services::spotify::{Profile, SpotifyClient, TokenSet};

/// Find the user for `profile`, creating one on first login, then persist
/// the fresh token set.
///
/// A concurrent first login for the same Spotify ID surfaces as
/// [`AppError::DuplicateUser`] from the store.
pub async fn resolve_user(
    users: &UserStore,
    profile: &Profile,
    tokens: &TokenSet,
) -> Result<User, AppError> {
    let mut user = match users.find_user_by_provider_id(&profile.spotify_id).await? {
        Some(user) => {
            tracing::debug!(user_id = %user.id, "Returning user");
            user
        }
        None => users.create_user(profile).await?,
    };

    users.save_credentials(&mut user, tokens).await?;
    Ok(user)
}

/// Exchange the authorization code and resolve the local user.
///
/// Steps run strictly in order: exchange, profile, store.
pub async fn complete_login(
    spotify: &SpotifyClient,
    users: &UserStore,
    code: &str,
    redirect_uri: &str,
) -> Result<User, AppError> {
    tracing::info!("Exchanging authorization code for tokens");
    let tokens = spotify.exchange_code(code, redirect_uri).await?;

    let profile = spotify
        .fetch_current_profile(&tokens.access_token)
        .await
        .map_err(|e| match e {
            AppError::TokenExpired => {
                AppError::ProfileFetch("Freshly issued access token was rejected".to_string())
            }
            other => other,
        })?;

    let user = resolve_user(users, &profile, &tokens).await?;

    tracing::info!(
        user_id = %user.id,
        spotify_id = %user.spotify_id,
        "Login completed, tokens stored"
    );
    Ok(user)
}
