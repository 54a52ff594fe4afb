//! Repository port for model persistence.
//!
//! This module defines the trait boundary between the domain and infrastructure
//! layers for model storage and retrieval.

use std::path::Path;

use crate::{Result, q_learning::SavedModel};

/// Port for persisting and loading Q-learning models.
///
/// This trait abstracts the storage mechanism, allowing different implementations
/// (JSON files, in-memory maps) without coupling the domain logic to a
/// specific storage location.
///
/// # Examples
///
/// ```no_run
/// use qchomp::ports::ModelRepository;
/// use qchomp::q_learning::SavedModel;
/// use std::path::Path;
///
/// fn store<R: ModelRepository>(
///     repo: &R,
///     model: &SavedModel,
///     path: &Path,
/// ) -> qchomp::Result<()> {
///     repo.save(model, path)
/// }
/// ```
pub trait ModelRepository {
    /// Save a model record.
    ///
    /// Implementations must either store the complete record or leave any
    /// previous record under `path` untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be created or written to
    /// - Serialization fails
    fn save(&self, model: &SavedModel, path: &Path) -> Result<()>;

    /// Load a model record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No model is stored under `path`
    /// - The stored data is malformed or truncated
    fn load(&self, path: &Path) -> Result<SavedModel>;
}
