//! Configuration types for games and agents.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, chomp::Action};

/// Smallest allowed grid height or width.
pub const MIN_DIMENSION: usize = 2;
/// Largest allowed grid height or width.
pub const MAX_DIMENSION: usize = 20;

/// Dimensions and poisoned cell of a Chomp grid.
///
/// # Examples
///
/// ```
/// use qchomp::{app::GridConfig, chomp::Action};
///
/// let config = GridConfig::new(4, 5, Action::new(0, 0))?;
/// assert_eq!(config.height, 4);
///
/// assert!(GridConfig::new(1, 5, Action::new(0, 0)).is_err());
/// # Ok::<(), qchomp::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub height: usize,
    pub width: usize,
    pub poisoned: Action,
}

impl GridConfig {
    /// Create a validated grid configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either dimension is outside
    /// `[2, 20]` or the poisoned cell lies outside the grid.
    pub fn new(height: usize, width: usize, poisoned: Action) -> Result<Self> {
        let config = Self {
            height,
            width,
            poisoned,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a playable grid.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("height", self.height), ("width", self.width)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                return Err(Error::config(format!(
                    "grid {name} {value} must be between {MIN_DIMENSION} and {MAX_DIMENSION}"
                )));
            }
        }
        if self.poisoned.row >= self.height || self.poisoned.col >= self.width {
            return Err(Error::config(format!(
                "poisoned cell {} lies outside a {}x{} grid",
                self.poisoned, self.height, self.width
            )));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            height: 6,
            width: 9,
            poisoned: Action::new(0, 0),
        }
    }
}

/// Hyperparameters for a Q-learning agent.
///
/// # Examples
///
/// ```
/// use qchomp::app::AgentConfig;
///
/// let config = AgentConfig::new(0.5, 0.1).with_seed(42);
/// assert!(config.validate().is_ok());
/// assert!(AgentConfig::new(0.0, 0.1).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Learning rate α, in (0, 1]
    pub alpha: f64,
    /// Exploration probability ε, in [0, 1]
    pub epsilon: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new(alpha: f64, epsilon: f64) -> Self {
        Self {
            alpha,
            epsilon,
            seed: None,
        }
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if α is outside (0, 1] or ε is
    /// outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!(
                "learning rate {} must be in (0, 1]",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::config(format!(
                "epsilon {} must be in [0, 1]",
                self.epsilon
            )));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(0.5, 0.1)
    }
}
