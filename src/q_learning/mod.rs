//! Tabular Q-learning for Chomp
//!
//! This module implements the learning side of the crate: a sparse table of
//! state-action values keyed by full grid contents, an ε-greedy agent that
//! reads and updates it, and the persisted model format.
//!
//! ## Update rule
//!
//! Q(s,a) ← Q(s,a) + α[r + max_a' Q(s',a') - Q(s,a)]
//!
//! There is no discount factor: games are short and finite, and the reward
//! signal is only ever ±1 at the end of a game.
//!
//! ## Usage Example
//!
//! ```no_run
//! use qchomp::{
//!     adapters::JsonFileRepository,
//!     app::{AgentConfig, GridConfig},
//!     chomp::GameState,
//!     q_learning::{QAgent, load_model, save_model},
//! };
//!
//! let agent = QAgent::new(AgentConfig::new(0.5, 0.1))?;
//! let game = GameState::new(GridConfig::default())?;
//!
//! let repo = JsonFileRepository::new();
//! let path = save_model(&repo, &agent, &game, 1, None)?;
//! let loaded = load_model(&repo, &path)?;
//! assert_eq!(loaded.iterations, 1);
//! # Ok::<(), qchomp::Error>(())
//! ```

pub mod agent;
pub mod q_table;
pub mod serialization;

pub use agent::QAgent;
pub use q_table::QTable;
pub use serialization::{
    LoadedModel, ModelEntry, SavedModel, default_model_path, load_model, save_model,
};
