// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use ring::rand::{SecureRandom, SystemRandom};
use std::env;

/// OAuth scopes requested from Spotify.
pub const SPOTIFY_SCOPE: &str = "user-read-private user-read-email user-library-read";

/// Spotify accounts service (authorize + token endpoints).
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Spotify Web API base.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spotify OAuth client ID (public)
    pub spotify_client_id: String,
    /// Spotify OAuth client secret
    pub spotify_client_secret: String,
    /// Externally visible base URL, used to build the OAuth redirect URI
    pub public_url: String,
    /// Server port
    pub port: u16,
    /// HMAC key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// GCP project ID; selects the Firestore user store when set
    pub gcp_project_id: Option<String>,
    pub spotify_accounts_url: String,
    pub spotify_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_signing_key = match env::var("SESSION_SIGNING_KEY") {
            Ok(key) if !key.trim().is_empty() => key.trim().as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "SESSION_SIGNING_KEY not set, sessions will not survive a restart"
                );
                random_key()?
            }
        };

        Ok(Self {
            spotify_client_id: env::var("SPOTIFY_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SPOTIFY_CLIENT_ID"))?,
            spotify_client_secret: env::var("SPOTIFY_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))?,
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_signing_key,
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            spotify_accounts_url: env::var("SPOTIFY_ACCOUNTS_URL")
                .unwrap_or_else(|_| DEFAULT_ACCOUNTS_URL.to_string()),
            spotify_api_url: env::var("SPOTIFY_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            spotify_client_id: "test_client_id".to_string(),
            spotify_client_secret: "test_secret".to_string(),
            public_url: "http://localhost:8080".to_string(),
            port: 8080,
            session_signing_key: b"test_session_key_32_bytes_min!!".to_vec(),
            gcp_project_id: None,
            spotify_accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            spotify_api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Absolute callback URL registered with Spotify.
    pub fn redirect_uri(&self) -> String {
        format!("{}/spotify_auth_landing/", self.public_url)
    }

    /// Cookies get the `Secure` attribute when served over https.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

fn random_key() -> Result<Vec<u8>, ConfigError> {
    let mut key = vec![0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| ConfigError::Random)?;
    Ok(key)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("System random number generator unavailable")]
    Random,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so every env assertion lives in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var("SPOTIFY_CLIENT_ID");
        env::remove_var("SPOTIFY_CLIENT_SECRET");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("SPOTIFY_CLIENT_ID"))
        ));

        env::set_var("SPOTIFY_CLIENT_ID", "test_id");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))
        ));

        env::set_var("SPOTIFY_CLIENT_SECRET", " test_secret\n");
        env::set_var("PUBLIC_URL", "https://insights.example.com/");
        env::set_var("SESSION_SIGNING_KEY", "test_session_key_32_bytes_min!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.spotify_client_id, "test_id");
        assert_eq!(config.spotify_client_secret, "test_secret");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.redirect_uri(),
            "https://insights.example.com/spotify_auth_landing/"
        );
        assert!(config.secure_cookies());
        assert_eq!(config.session_signing_key, b"test_session_key_32_bytes_min!!");
    }

    #[test]
    fn test_default_redirect_uri_is_local() {
        let config = Config::test_default();
        assert_eq!(
            config.redirect_uri(),
            "http://localhost:8080/spotify_auth_landing/"
        );
        assert!(!config.secure_cookies());
    }
}
