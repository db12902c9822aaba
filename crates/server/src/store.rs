//! Collaborators of the recommendation service.
//!
//! The service never owns persistence: it reads the catalog through a
//! [`CatalogProvider`] and loads/saves profiles through a [`ProfileStore`].
//! Pick one implementation of each per deployment.

use crate::error::{Result, ServiceError};
use catalog::{Catalog, UserProfile};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

// =============================================================================
// Catalog providers
// =============================================================================

/// Supplies the read-only item catalog
pub trait CatalogProvider: Send + Sync {
    fn catalog(&self) -> Arc<Catalog>;
}

/// A catalog fixed at startup
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    catalog: Arc<Catalog>,
}

impl StaticCatalogProvider {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Load attributes.dat / items.dat from a directory
    pub fn from_dir(data_dir: &Path) -> Result<Self> {
        Ok(Self::new(Catalog::load_from_files(data_dir)?))
    }

    /// The built-in demo catalog
    pub fn seeded() -> Result<Self> {
        Ok(Self::new(catalog::seed::seed_catalog()?))
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}

// =============================================================================
// Profile stores
// =============================================================================

/// Loads and persists user profiles
pub trait ProfileStore: Send + Sync {
    /// Returns the name of this store (for logging/debugging)
    fn name(&self) -> &str;

    /// `Ok(None)` when the user has no stored profile yet
    fn load(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Insert or replace the profile of `profile.user_id`
    fn save(&self, profile: &UserProfile) -> Result<()>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn name(&self) -> &str {
        "InMemoryProfileStore"
    }

    fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| ServiceError::Store("profile map lock poisoned".to_string()))?;
        Ok(profiles.get(user_id).cloned())
    }

    fn save(&self, profile: &UserProfile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| ServiceError::Store("profile map lock poisoned".to_string()))?;
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per user under a directory
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    dir: PathBuf,
}

impl JsonFileProfileStore {
    /// Use `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ServiceError::Store(format!("cannot create {}: {}", dir.display(), e))
        })?;
        info!("Storing profiles as JSON under {:?}", dir);
        Ok(Self { dir })
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        let valid = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !user_id.starts_with('.');
        if !valid {
            return Err(ServiceError::Store(format!(
                "user id '{}' cannot be used as a file name",
                user_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", user_id)))
    }
}

impl ProfileStore for JsonFileProfileStore {
    fn name(&self) -> &str {
        "JsonFileProfileStore"
    }

    fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ServiceError::Store(format!("cannot read {}: {}", path.display(), e)))?;
        let profile = serde_json::from_str(&content)
            .map_err(|e| ServiceError::Store(format!("corrupt profile {}: {}", path.display(), e)))?;
        Ok(Some(profile))
    }

    fn save(&self, profile: &UserProfile) -> Result<()> {
        let path = self.path_for(&profile.user_id)?;
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| ServiceError::Store(format!("cannot serialize profile: {}", e)))?;

        // Write then rename so readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| ServiceError::Store(format!("cannot write {}: {}", path.display(), e)))?;

        debug!("Saved profile {} to {:?}", profile.user_id, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::seed::default_profile;
    use catalog::FeedbackEvent;

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemoryProfileStore::new();
        assert!(store.load("u1").unwrap().is_none());

        let profile = default_profile("u1", 5);
        store.save(&profile).unwrap();
        assert_eq!(store.load("u1").unwrap(), Some(profile));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut profile = default_profile("aylin", 5);
        profile.feedback.push(FeedbackEvent {
            item_id: "m1".to_string(),
            rating: 0.95,
            timestamp: 1_700_000_000,
            reason: "In-app tap".to_string(),
        });

        JsonFileProfileStore::new(dir.path()).unwrap().save(&profile).unwrap();

        let reopened = JsonFileProfileStore::new(dir.path()).unwrap();
        let loaded = reopened.load("aylin").unwrap().unwrap();
        assert_eq!(loaded, profile);
        assert_eq!(loaded.feedback.capacity(), 5);
        assert!(reopened.load("someone-else").unwrap().is_none());
    }

    #[test]
    fn test_json_store_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileProfileStore::new(dir.path()).unwrap();

        for bad in ["", "../escape", "a/b", ".hidden"] {
            assert!(store.load(bad).is_err(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn test_json_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("u1.json"), "{ not json").unwrap();

        let store = JsonFileProfileStore::new(dir.path()).unwrap();
        assert!(matches!(store.load("u1"), Err(ServiceError::Store(_))));
    }

    #[test]
    fn test_static_provider_shares_catalog() {
        let provider = StaticCatalogProvider::seeded().unwrap();
        let a = provider.catalog();
        let b = provider.catalog();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 5);
    }
}
