//! Serialization support for Q-learning models.
//!
//! A model is persisted as one [`SavedModel`] record: the flattened Q-table
//! plus the grid it was trained on, the agent hyperparameters, and the number
//! of training games.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Error, Result,
    app::{AgentConfig, GridConfig},
    chomp::{Action, GameState, Grid},
    ports::ModelRepository,
    q_learning::{agent::QAgent, q_table::QTable},
};

/// A single Q-table entry in persisted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    /// Row-major cell codes: 0 blank, 1 used, 2 poisoned
    pub state: Vec<Vec<u8>>,
    pub action_row: usize,
    pub action_col: usize,
    pub value: f64,
}

/// Persisted model record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedModel {
    #[serde(default = "SavedModel::default_version")]
    pub version: u32,
    pub entries: Vec<ModelEntry>,
    pub grid_height: usize,
    pub grid_width: usize,
    pub poisoned_row: usize,
    pub poisoned_col: usize,
    pub learning_rate: f64,
    pub epsilon: f64,
    pub iterations: u64,
}

/// Result of loading a model: the restored agent, a fresh game on the
/// recorded board, and the number of games the model was trained for.
#[derive(Debug)]
pub struct LoadedModel {
    pub agent: QAgent,
    pub state: GameState,
    pub iterations: u64,
}

impl SavedModel {
    /// Current save format version
    pub const VERSION: u32 = 1;

    fn default_version() -> u32 {
        Self::VERSION
    }

    /// Snapshot an agent together with the board it plays on.
    ///
    /// Entries are sorted so the same table always produces the same record.
    pub fn from_agent(agent: &QAgent, state: &GameState, iterations: u64) -> Self {
        let mut entries: Vec<ModelEntry> = agent
            .q_table()
            .iter()
            .map(|(grid, action, value)| ModelEntry {
                state: grid.to_codes(),
                action_row: action.row,
                action_col: action.col,
                value,
            })
            .collect();
        entries.sort_by(|a, b| {
            (&a.state, a.action_row, a.action_col).cmp(&(&b.state, b.action_row, b.action_col))
        });

        let config = state.config();
        Self {
            version: Self::VERSION,
            entries,
            grid_height: config.height,
            grid_width: config.width,
            poisoned_row: config.poisoned.row,
            poisoned_col: config.poisoned.col,
            learning_rate: agent.learning_rate(),
            epsilon: agent.epsilon(),
            iterations,
        }
    }

    pub fn grid_config(&self) -> Result<GridConfig> {
        GridConfig::new(
            self.grid_height,
            self.grid_width,
            Action::new(self.poisoned_row, self.poisoned_col),
        )
        .map_err(|e| Error::decode(e.to_string()))
    }

    /// Rebuild the agent and a fresh game from the record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the record is inconsistent: unsupported
    /// version, bad dimensions, a state that does not match the grid, an
    /// out-of-range action, a non-finite value, a duplicate key, or invalid
    /// hyperparameters. Nothing is returned unless every entry is valid.
    pub fn to_model(&self) -> Result<LoadedModel> {
        if self.version != Self::VERSION {
            return Err(Error::decode(format!(
                "unsupported model format version {}, expected {}",
                self.version,
                Self::VERSION
            )));
        }

        let grid_config = self.grid_config()?;
        let agent_config = AgentConfig::new(self.learning_rate, self.epsilon);
        agent_config
            .validate()
            .map_err(|e| Error::decode(e.to_string()))?;

        let mut q_table = QTable::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let grid = Grid::from_codes(&entry.state, grid_config.height, grid_config.width)
                .map_err(|e| match e {
                    Error::Decode { message } => Error::decode(format!("entry {index}: {message}")),
                    other => other,
                })?;
            let action = Action::new(entry.action_row, entry.action_col);
            if !grid.contains(action) {
                return Err(Error::decode(format!(
                    "entry {index}: action {action} lies outside the grid"
                )));
            }
            if !entry.value.is_finite() {
                return Err(Error::decode(format!(
                    "entry {index}: value {} is not finite",
                    entry.value
                )));
            }
            let before = q_table.size();
            q_table.set(&grid, action, entry.value);
            if q_table.size() == before {
                return Err(Error::decode(format!(
                    "entry {index}: duplicate state-action key"
                )));
            }
        }

        Ok(LoadedModel {
            agent: QAgent::from_table(agent_config, q_table)?,
            state: GameState::new(grid_config)?,
            iterations: self.iterations,
        })
    }
}

/// Default model identifier: `{height}_{width}_{iterations}_model.json`.
pub fn default_model_path(config: &GridConfig, iterations: u64) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}_{}_model.json",
        config.height, config.width, iterations
    ))
}

/// Persist `agent` and its board through `repository`.
///
/// Returns the identifier the model was written under: `destination` when
/// given, otherwise [`default_model_path`].
pub fn save_model(
    repository: &dyn ModelRepository,
    agent: &QAgent,
    state: &GameState,
    iterations: u64,
    destination: Option<&Path>,
) -> Result<PathBuf> {
    let path = destination
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_model_path(state.config(), iterations));
    let record = SavedModel::from_agent(agent, state, iterations);
    repository.save(&record, &path)?;
    info!(
        path = %path.display(),
        entries = record.entries.len(),
        iterations,
        "saved model"
    );
    Ok(path)
}

/// Load a model previously written with [`save_model`].
pub fn load_model(repository: &dyn ModelRepository, path: &Path) -> Result<LoadedModel> {
    let record = repository.load(path)?;
    let model = record.to_model()?;
    if model.agent.transitions() == 0 {
        warn!(path = %path.display(), "loaded model has no learned values");
    }
    info!(
        path = %path.display(),
        entries = model.agent.transitions(),
        height = record.grid_height,
        width = record.grid_width,
        iterations = record.iterations,
        "loaded model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_record() -> SavedModel {
        let grid_config = GridConfig::new(2, 3, Action::new(0, 0)).unwrap();
        let mut agent = QAgent::new(AgentConfig::new(0.5, 0.2).with_seed(5)).unwrap();
        let start = GameState::new(grid_config).unwrap();
        let mut next = start.clone();
        next.apply_move(Action::new(1, 2)).unwrap();
        agent.update_model(start.grid(), Action::new(1, 2), next.grid(), 1.0);
        agent.update_model(next.grid(), Action::new(0, 1), start.grid(), -1.0);
        SavedModel::from_agent(&agent, &start, 42)
    }

    #[test]
    fn test_record_fields() {
        let record = trained_record();
        assert_eq!(record.entries.len(), 2);
        assert_eq!((record.grid_height, record.grid_width), (2, 3));
        assert_eq!(record.learning_rate, 0.5);
        assert_eq!(record.epsilon, 0.2);
        assert_eq!(record.iterations, 42);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(trained_record()).unwrap();
        for key in [
            "entries",
            "gridHeight",
            "gridWidth",
            "poisonedRow",
            "poisonedCol",
            "learningRate",
            "epsilon",
            "iterations",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        let entry = &json["entries"][0];
        assert!(entry["state"].is_array());
        assert!(entry["actionRow"].is_u64());
        assert!(entry["actionCol"].is_u64());
        assert!(entry["value"].is_f64());
    }

    #[test]
    fn test_to_model_restores_values() {
        let record = trained_record();
        let model = record.to_model().unwrap();
        assert_eq!(model.agent.transitions(), 2);
        assert_eq!(model.iterations, 42);
        assert_eq!(model.state.height(), 2);

        let start = model.state.grid().clone();
        assert_eq!(model.agent.q_table().get(&start, Action::new(1, 2)), 0.5);
    }

    #[test]
    fn test_missing_version_defaults() {
        let mut json = serde_json::to_value(trained_record()).unwrap();
        json.as_object_mut().unwrap().remove("version");
        let record: SavedModel = serde_json::from_value(json).unwrap();
        assert_eq!(record.version, SavedModel::VERSION);
    }

    #[test]
    fn test_inconsistent_records_rejected() {
        let mut wrong_dims = trained_record();
        wrong_dims.grid_width = 4;
        assert!(matches!(wrong_dims.to_model(), Err(Error::Decode { .. })));

        let mut bad_action = trained_record();
        bad_action.entries[0].action_col = 3;
        assert!(matches!(bad_action.to_model(), Err(Error::Decode { .. })));

        let mut duplicate = trained_record();
        let first = duplicate.entries[0].clone();
        duplicate.entries.push(first);
        assert!(matches!(duplicate.to_model(), Err(Error::Decode { .. })));

        let mut bad_alpha = trained_record();
        bad_alpha.learning_rate = 0.0;
        assert!(matches!(bad_alpha.to_model(), Err(Error::Decode { .. })));

        let mut bad_poison = trained_record();
        bad_poison.poisoned_row = 2;
        assert!(matches!(bad_poison.to_model(), Err(Error::Decode { .. })));

        let mut bad_version = trained_record();
        bad_version.version = 9;
        assert!(matches!(bad_version.to_model(), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_default_model_path() {
        let config = GridConfig::new(4, 7, Action::new(0, 0)).unwrap();
        assert_eq!(
            default_model_path(&config, 5000),
            PathBuf::from("4_7_5000_model.json")
        );
    }
}
