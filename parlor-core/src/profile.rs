//! Seam to the durable profile backend.
//!
//! The backend itself is an external collaborator; the core only ever
//! persists named blobs under a user key and fetches a sorted profile
//! list. [`MemoryProfileStore`] backs tests and demos.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("no blob '{name}' stored for user '{user_key}'")]
    BlobNotFound { user_key: String, name: String },
    #[error("profile backend unavailable: {0}")]
    Backend(String),
}

/// One row of the sorted profile listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProfileSummary {
    pub key: String,
    pub name: String,
    pub score: u32,
}

/// Narrow interface to whatever stores profiles durably
pub trait ProfileStore {
    /// Persist a named blob under a user key, replacing any previous value
    fn put_blob(&mut self, user_key: &str, name: &str, bytes: Vec<u8>) -> Result<(), ProfileError>;

    /// Fetch a previously persisted blob
    fn get_blob(&self, user_key: &str, name: &str) -> Result<Vec<u8>, ProfileError>;

    /// Profiles ordered by descending score, ties broken by key
    fn list_profiles_sorted(&self) -> Result<Vec<ProfileSummary>, ProfileError>;
}

/// In-memory store for tests and demos
#[derive(Debug, Default, Clone)]
pub struct MemoryProfileStore {
    blobs: HashMap<(String, String), Vec<u8>>,
    profiles: Vec<ProfileSummary>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, key: &str, name: &str, score: u32) -> Self {
        self.profiles.push(ProfileSummary {
            key: key.to_string(),
            name: name.to_string(),
            score,
        });
        self
    }
}

impl ProfileStore for MemoryProfileStore {
    fn put_blob(&mut self, user_key: &str, name: &str, bytes: Vec<u8>) -> Result<(), ProfileError> {
        self.blobs
            .insert((user_key.to_string(), name.to_string()), bytes);
        Ok(())
    }

    fn get_blob(&self, user_key: &str, name: &str) -> Result<Vec<u8>, ProfileError> {
        self.blobs
            .get(&(user_key.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ProfileError::BlobNotFound {
                user_key: user_key.to_string(),
                name: name.to_string(),
            })
    }

    fn list_profiles_sorted(&self) -> Result<Vec<ProfileSummary>, ProfileError> {
        let mut listed = self.profiles.clone();
        listed.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.key.cmp(&b.key)));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_round_trips() {
        let mut store = MemoryProfileStore::new();
        store.put_blob("user-1", "settings", vec![1, 2, 3]).unwrap();

        assert_eq!(store.get_blob("user-1", "settings").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_put_replaces_previous_blob() {
        let mut store = MemoryProfileStore::new();
        store.put_blob("user-1", "settings", vec![1]).unwrap();
        store.put_blob("user-1", "settings", vec![2]).unwrap();

        assert_eq!(store.get_blob("user-1", "settings").unwrap(), vec![2]);
    }

    #[test]
    fn test_missing_blob_is_typed_error() {
        let store = MemoryProfileStore::new();

        assert_eq!(
            store.get_blob("user-1", "settings"),
            Err(ProfileError::BlobNotFound {
                user_key: "user-1".to_string(),
                name: "settings".to_string(),
            })
        );
    }

    #[test]
    fn test_listing_sorts_by_score_then_key() {
        let store = MemoryProfileStore::new()
            .with_profile("c", "Carol", 10)
            .with_profile("a", "Alice", 30)
            .with_profile("b", "Bob", 10);

        let listed = store.list_profiles_sorted().unwrap();
        let keys: Vec<&str> = listed.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
