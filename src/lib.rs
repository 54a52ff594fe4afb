//! QChomp: the game of Chomp with a tabular Q-learning agent
//!
//! This crate provides:
//! - Chomp rules on a rectangular grid with one poisoned cell
//! - A Q-learning agent with ε-greedy exploration and a move-area limit
//! - Self-play training and evaluation pipelines with pluggable observers
//! - JSON model persistence behind a repository port
//! - The `qchomp` command-line front-end
//!
//! # Examples
//!
//! ```
//! use qchomp::{
//!     app::{AgentConfig, App, GridConfig},
//!     chomp::Action,
//!     pipeline::TrainingConfig,
//! };
//!
//! let app = App::new();
//! let grid = GridConfig::new(3, 4, Action::new(0, 0))?;
//! let mut agent = app.create_agent(AgentConfig::default().with_seed(1))?;
//!
//! let config = TrainingConfig { iterations: 200, ..Default::default() };
//! let result = app.training_pipeline(grid, config).run(&mut agent)?;
//! assert_eq!(result.games, 200);
//!
//! let game = app.new_game(grid)?;
//! let opening = agent.choose_action(game.grid(), false, None);
//! assert!(opening.is_some());
//! # Ok::<(), qchomp::Error>(())
//! ```

pub mod adapters;
pub mod app;
pub mod chomp;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use error::{Error, Result};
