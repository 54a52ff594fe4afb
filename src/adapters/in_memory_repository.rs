//! In-memory model repository.
//!
//! This adapter provides a pure in-memory implementation of ModelRepository,
//! enabling fast tests and long-running hosts that keep trained models around
//! without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Result, error::Error, ports::ModelRepository, q_learning::SavedModel};

/// In-memory repository.
///
/// Records are stored as JSON text, so a round-trip through this repository
/// exercises the same encoding as the file-backed one.
///
/// # Examples
///
/// ```
/// use qchomp::adapters::InMemoryRepository;
/// use qchomp::app::{AgentConfig, GridConfig};
/// use qchomp::chomp::GameState;
/// use qchomp::q_learning::{QAgent, load_model, save_model};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = QAgent::new(AgentConfig::default())?;
/// let game = GameState::new(GridConfig::default())?;
///
/// save_model(&repo, &agent, &game, 10, Some(Path::new("easy")))?;
/// let loaded = load_model(&repo, Path::new("easy"))?;
/// assert_eq!(loaded.iterations, 10);
/// # Ok::<(), qchomp::Error>(())
/// ```
///
/// # Thread Safety
///
/// This repository is thread-safe and can be safely cloned and shared across
/// threads. All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the number of models currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored models.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a model exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(path.to_string_lossy().as_ref())
    }

    /// Raw stored text, mainly for tests that corrupt a record on purpose.
    pub fn insert_raw(&self, path: &Path, text: impl Into<String>) {
        self.storage()
            .insert(path.to_string_lossy().to_string(), text.into());
    }
}

impl ModelRepository for InMemoryRepository {
    fn save(&self, model: &SavedModel, path: &Path) -> Result<()> {
        let text = serde_json::to_string(model)?;
        self.storage()
            .insert(path.to_string_lossy().to_string(), text);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedModel> {
        let storage = self.storage();
        let text = storage
            .get(path.to_string_lossy().as_ref())
            .ok_or_else(|| Error::ModelNotFound {
                id: path.display().to_string(),
            })?;

        serde_json::from_str(text).map_err(|e| Error::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::{AgentConfig, GridConfig},
        chomp::GameState,
        q_learning::QAgent,
    };

    fn record() -> SavedModel {
        let agent = QAgent::new(AgentConfig::default()).unwrap();
        SavedModel::from_agent(&agent, &GameState::new(GridConfig::default()).unwrap(), 3)
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let path = Path::new("test_model");

        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&record(), path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));

        assert_eq!(repo.load(path).unwrap(), record());
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        let result = repo.load(Path::new("nonexistent"));
        assert!(matches!(result, Err(Error::ModelNotFound { .. })));
    }

    #[test]
    fn test_malformed_record_is_decode_error() {
        let repo = InMemoryRepository::new();
        repo.insert_raw(Path::new("broken"), r#"{"entries": [{"state": "#);
        assert!(matches!(
            repo.load(Path::new("broken")),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_clear_removes_all() {
        let repo = InMemoryRepository::new();
        repo.save(&record(), Path::new("m1")).unwrap();
        repo.save(&record(), Path::new("m2")).unwrap();
        assert_eq!(repo.count(), 2);

        repo.clear();
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();
        let path = Path::new("shared");

        repo1.save(&record(), path).unwrap();
        assert!(repo2.load(path).is_ok());
        assert_eq!(repo2.count(), 1);
    }
}
