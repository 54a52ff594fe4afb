//! Application layer with dependency injection container.
//!
//! The container owns infrastructure dependencies and provides factory methods
//! for creating domain objects, following hexagonal architecture principles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │          App (DI Container)          │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                      │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - JsonFileRepository                │   │
//! │  │  - InMemoryRepository (testing)      │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - ModelRepository trait             │   │
//! │  │  - Observer trait                    │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                   │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic                        │   │
//! │  │  - GameState / Grid                  │   │
//! │  │  - QAgent / QTable                   │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use qchomp::app::{AgentConfig, App, GridConfig};
//!
//! let app = App::new();
//! let agent = app.create_agent(AgentConfig::default().with_seed(42))?;
//! let game = app.new_game(GridConfig::default())?;
//! assert_eq!(game.height(), 6);
//! # Ok::<(), qchomp::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::{AgentConfig, GridConfig, MAX_DIMENSION, MIN_DIMENSION};
pub use container::{App, AppBuilder};
