// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process user storage for local development and tests.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;

/// Users keyed by Spotify ID. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<String, User>>,
}

impl MemoryDb {
    pub fn get_user(&self, spotify_id: &str) -> Option<User> {
        self.users.get(spotify_id).map(|u| u.value().clone())
    }

    pub fn get_user_by_local_id(&self, user_id: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.value().id == user_id)
            .map(|entry| entry.value().clone())
    }

    /// Insert-if-absent; the shard lock makes check and insert atomic.
    pub fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.users.entry(user.spotify_id.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateUser(user.spotify_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    pub fn update_user(&self, user: &User) {
        self.users.insert(user.spotify_id.clone(), user.clone());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(id: &str, spotify_id: &str) -> User {
        User {
            id: id.to_string(),
            display_name: "Test User".to_string(),
            spotify_id: spotify_id.to_string(),
            email: None,
            tokens: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            last_login: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_spotify_id() {
        let db = MemoryDb::default();
        db.insert_user(&test_user("a", "spotify-1")).unwrap();

        let err = db.insert_user(&test_user("b", "spotify-1")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser(ref id) if id == "spotify-1"));
        assert_eq!(db.len(), 1);
        assert_eq!(db.get_user("spotify-1").unwrap().id, "a");
    }

    #[test]
    fn test_lookup_by_local_id() {
        let db = MemoryDb::default();
        db.insert_user(&test_user("a", "spotify-1")).unwrap();
        db.insert_user(&test_user("b", "spotify-2")).unwrap();

        assert_eq!(db.get_user_by_local_id("b").unwrap().spotify_id, "spotify-2");
        assert!(db.get_user_by_local_id("c").is_none());
    }

    #[test]
    fn test_concurrent_inserts_create_one_user() {
        let db = MemoryDb::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                std::thread::spawn(move || db.insert_user(&test_user(&i.to_string(), "same")).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(db.len(), 1);
    }
}
