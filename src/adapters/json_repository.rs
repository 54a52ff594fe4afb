//! JSON file implementation of the model repository.
//!
//! Saves go through a temporary file in the destination directory that is
//! renamed over the target only after the whole record is written, so a
//! failed save never leaves a truncated model behind.

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::{Result, error::Error, ports::ModelRepository, q_learning::SavedModel};

/// File-based repository storing one pretty-printed JSON record per model.
///
/// # Examples
///
/// ```no_run
/// use qchomp::adapters::JsonFileRepository;
/// use qchomp::ports::ModelRepository;
/// use std::path::Path;
///
/// let repo = JsonFileRepository::new();
/// let model = repo.load(Path::new("6_9_5000_model.json"))?;
/// println!("{} entries", model.entries.len());
/// # Ok::<(), qchomp::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileRepository;

impl JsonFileRepository {
    /// Create a new JSON file repository.
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for JsonFileRepository {
    fn save(&self, model: &SavedModel, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
            operation: format!("create temporary file in {dir:?}"),
            source,
        })?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, model)?;
            writer.flush().map_err(|source| Error::Io {
                operation: format!("write model for {path:?}"),
                source,
            })?;
        }
        tmp.as_file().sync_all().map_err(|source| Error::Io {
            operation: format!("sync model for {path:?}"),
            source,
        })?;

        tmp.persist(path).map_err(|e| Error::Io {
            operation: format!("move model into place at {path:?}"),
            source: e.error,
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedModel> {
        let file = File::open(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::ModelNotFound {
                    id: path.display().to_string(),
                }
            } else {
                Error::Io {
                    operation: format!("open file {path:?}"),
                    source,
                }
            }
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        app::{AgentConfig, GridConfig},
        chomp::GameState,
        q_learning::QAgent,
    };

    fn record(iterations: u64) -> SavedModel {
        let agent = QAgent::new(AgentConfig::default()).unwrap();
        SavedModel::from_agent(&agent, &GameState::new(GridConfig::default()).unwrap(), iterations)
    }

    #[test]
    fn test_json_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("model.json");

        let repo = JsonFileRepository::new();
        repo.save(&record(7), &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, record(7));
    }

    #[test]
    fn test_overwrite_replaces_previous_record() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("model.json");
        let repo = JsonFileRepository::new();

        repo.save(&record(1), &file_path).unwrap();
        repo.save(&record(2), &file_path).unwrap();
        assert_eq!(repo.load(&file_path).unwrap().iterations, 2);

        // No temporary files are left next to the model
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = JsonFileRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_qchomp_12345.json"));
        assert!(matches!(result, Err(Error::ModelNotFound { .. })));
    }

    #[test]
    fn test_truncated_file_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("model.json");
        let repo = JsonFileRepository::new();
        repo.save(&record(1), &file_path).unwrap();

        let text = std::fs::read_to_string(&file_path).unwrap();
        std::fs::write(&file_path, &text[..text.len() / 2]).unwrap();
        assert!(matches!(repo.load(&file_path), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_failed_save_leaves_existing_model_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::new();

        // A non-empty directory at the target makes the final rename fail
        let target = temp_dir.path().join("model.json");
        std::fs::create_dir(&target).unwrap();
        let existing = target.join("kept.json");
        repo.save(&record(1), &existing).unwrap();
        let before = std::fs::read(&existing).unwrap();

        let result = repo.save(&record(2), &target);
        assert!(matches!(result, Err(Error::Io { .. })));
        assert_eq!(std::fs::read(&existing).unwrap(), before);
        assert_eq!(repo.load(&existing).unwrap().iterations, 1);

        // The abandoned temporary file is removed
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = JsonFileRepository::new();
        let result = repo.save(&record(1), Path::new("/invalid_dir_12345/model.json"));
        assert!(result.is_err());
    }
}
