// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed session tokens binding a browser to a local user.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::User;
use crate::time_utils::unix_now;

/// Session lifetime ("remember me"): 30 days.
pub const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (local user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionManager {
    signing_key: Vec<u8>,
}

impl SessionManager {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            signing_key: signing_key.to_vec(),
        }
    }

    /// Start a session for `user`, returning the opaque cookie value.
    pub fn login(&self, user: &User) -> Result<String, AppError> {
        let now = unix_now();
        let claims = Claims {
            sub: user.id.clone(),
            iat: now,
            exp: now + SESSION_TTL_SECS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))
    }

    /// Verify a session token and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let key = DecodingKey::from_secret(&self.signing_key);
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AppError::Unauthenticated
            })
    }

    /// Resolve the user behind a session token.
    pub async fn current_user(&self, users: &UserStore, token: &str) -> Result<User, AppError> {
        let user_id = self.verify(token)?;
        users.find_user_by_id(&user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Session refers to unknown user");
            AppError::Unauthenticated
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::spotify::Profile;

    fn profile() -> Profile {
        Profile {
            display_name: "Test User".to_string(),
            spotify_id: "spotify-1".to_string(),
            email: None,
            country: None,
            product: None,
            followers: 0,
        }
    }

    #[tokio::test]
    async fn test_login_then_current_user() {
        let users = UserStore::in_memory();
        let user = users.create_user(&profile()).await.unwrap();
        let sessions = SessionManager::new(b"test_session_key_32_bytes_min!!");

        let token = sessions.login(&user).unwrap();
        let resolved = sessions.current_user(&users, &token).await.unwrap();

        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_token_from_other_key_is_rejected() {
        let users = UserStore::in_memory();
        let user = users.create_user(&profile()).await.unwrap();

        let token = SessionManager::new(b"other_key").login(&user).unwrap();
        let sessions = SessionManager::new(b"test_session_key_32_bytes_min!!");

        assert!(matches!(
            sessions.current_user(&users, &token).await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_unauthenticated() {
        let users = UserStore::in_memory();
        let sessions = SessionManager::new(b"test_session_key_32_bytes_min!!");
        let ghost = User {
            id: "ghost".to_string(),
            display_name: "Ghost".to_string(),
            spotify_id: "ghost".to_string(),
            email: None,
            tokens: None,
            created_at: String::new(),
            last_login: String::new(),
        };

        let token = sessions.login(&ghost).unwrap();
        assert!(matches!(
            sessions.current_user(&users, &token).await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let key = b"test_session_key_32_bytes_min!!";
        let claims = Claims {
            sub: "user".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .unwrap();

        assert!(SessionManager::new(key).verify(&token).is_err());
    }
}
