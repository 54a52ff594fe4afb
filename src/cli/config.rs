//! Shared configuration types for CLI commands

use std::{fs::File, io::BufReader, num::NonZeroUsize, path::Path};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
    app::{AgentConfig, GridConfig},
    chomp::Action,
    pipeline::TrainingConfig,
};

/// Board flags shared by `train` and `play`
#[derive(Args, Debug, Clone, Default)]
pub struct GridArgs {
    /// Grid height (2-20)
    #[arg(long)]
    pub height: Option<usize>,

    /// Grid width (2-20)
    #[arg(long)]
    pub width: Option<usize>,

    /// Row of the poisoned cell (0-based)
    #[arg(long)]
    pub poisoned_row: Option<usize>,

    /// Column of the poisoned cell (0-based)
    #[arg(long)]
    pub poisoned_col: Option<usize>,
}

impl GridArgs {
    /// Overlay the given flags on `base` and validate the result.
    pub fn resolve(&self, base: GridConfig) -> Result<GridConfig> {
        let config = GridConfig::new(
            self.height.unwrap_or(base.height),
            self.width.unwrap_or(base.width),
            Action::new(
                self.poisoned_row.unwrap_or(base.poisoned.row),
                self.poisoned_col.unwrap_or(base.poisoned.col),
            ),
        )?;
        Ok(config)
    }
}

/// Learning hyperparameter flags shared by `train` and `play`
#[derive(Args, Debug, Clone, Default)]
pub struct AgentArgs {
    /// Learning rate α in (0, 1]
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Exploration probability ε in [0, 1]
    #[arg(long)]
    pub epsilon: Option<f64>,
}

impl AgentArgs {
    pub fn resolve(&self, base: AgentConfig) -> Result<AgentConfig> {
        let config = AgentConfig {
            alpha: self.alpha.unwrap_or(base.alpha),
            epsilon: self.epsilon.unwrap_or(base.epsilon),
            seed: base.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Contents of a `--config` file for `train`
///
/// Every section is optional; missing values fall back to the defaults.
///
/// ```json
/// {
///   "grid": { "height": 4, "width": 7, "poisoned": { "row": 0, "col": 0 } },
///   "agent": { "alpha": 0.5, "epsilon": 0.2 },
///   "training": { "iterations": 20000, "moveAreaLimit": 6 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainFileConfig {
    pub grid: GridFileSection,
    pub agent: AgentFileSection,
    pub training: TrainingFileSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridFileSection {
    pub height: usize,
    pub width: usize,
    pub poisoned: Action,
}

impl Default for GridFileSection {
    fn default() -> Self {
        let grid = GridConfig::default();
        Self {
            height: grid.height,
            width: grid.width,
            poisoned: grid.poisoned,
        }
    }
}

impl From<&GridFileSection> for GridConfig {
    fn from(section: &GridFileSection) -> Self {
        GridConfig {
            height: section.height,
            width: section.width,
            poisoned: section.poisoned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentFileSection {
    pub alpha: f64,
    pub epsilon: f64,
}

impl Default for AgentFileSection {
    fn default() -> Self {
        let agent = AgentConfig::default();
        Self {
            alpha: agent.alpha,
            epsilon: agent.epsilon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainingFileSection {
    pub iterations: usize,
    pub move_area_limit: Option<NonZeroUsize>,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub stats_interval: usize,
    pub seed: Option<u64>,
}

impl Default for TrainingFileSection {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            iterations: training.iterations,
            move_area_limit: training.move_area_limit,
            epsilon_decay: training.epsilon_decay,
            min_epsilon: training.min_epsilon,
            stats_interval: training.stats_interval,
            seed: training.seed,
        }
    }
}

impl From<&TrainingFileSection> for TrainingConfig {
    fn from(section: &TrainingFileSection) -> Self {
        TrainingConfig {
            iterations: section.iterations,
            move_area_limit: section.move_area_limit,
            epsilon_decay: section.epsilon_decay,
            min_epsilon: section.min_epsilon,
            stats_interval: section.stats_interval,
            seed: section.seed,
        }
    }
}

impl TrainFileConfig {
    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open config file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn grid(&self) -> GridConfig {
        GridConfig::from(&self.grid)
    }

    pub fn agent(&self) -> AgentConfig {
        AgentConfig::new(self.agent.alpha, self.agent.epsilon)
    }

    pub fn training(&self) -> TrainingConfig {
        TrainingConfig::from(&self.training)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: TrainFileConfig =
            serde_json::from_str(r#"{ "grid": { "height": 4 }, "training": { "moveAreaLimit": 3 } }"#)
                .unwrap();
        assert_eq!(config.grid().height, 4);
        assert_eq!(config.grid().width, 9);
        assert_eq!(config.agent(), AgentConfig::default());
        assert_eq!(config.training().move_area_limit, NonZeroUsize::new(3));
        assert_eq!(config.training().iterations, TrainingConfig::default().iterations);
    }

    #[test]
    fn test_flags_override_base() {
        let flags = GridArgs {
            width: Some(5),
            poisoned_col: Some(4),
            ..Default::default()
        };
        let grid = flags.resolve(GridConfig::default()).unwrap();
        assert_eq!((grid.height, grid.width), (6, 5));
        assert_eq!(grid.poisoned, Action::new(0, 4));

        let bad = GridArgs {
            height: Some(30),
            ..Default::default()
        };
        assert!(bad.resolve(GridConfig::default()).is_err());

        let agent = AgentArgs {
            epsilon: Some(0.3),
            ..Default::default()
        }
        .resolve(AgentConfig::default())
        .unwrap();
        assert_eq!((agent.alpha, agent.epsilon), (0.5, 0.3));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(TrainFileConfig::load(Path::new("/nonexistent/qchomp.json")).is_err());
    }
}
