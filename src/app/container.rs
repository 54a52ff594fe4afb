//! Dependency injection container for the QChomp application.
//!
//! The container owns infrastructure dependencies and provides factory methods
//! for creating agents, games, and training pipelines.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use super::config::{AgentConfig, GridConfig};
use crate::{
    Result,
    adapters::JsonFileRepository,
    chomp::GameState,
    pipeline::{TrainingConfig, TrainingPipeline},
    ports::ModelRepository,
    q_learning::{self, LoadedModel, QAgent},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use qchomp::app::{AgentConfig, App};
///
/// let app = App::new();
/// let agent = app.create_agent(AgentConfig::default().with_seed(42))?;
/// assert_eq!(agent.transitions(), 0);
/// # Ok::<(), qchomp::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use qchomp::adapters::InMemoryRepository;
/// use qchomp::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for model persistence
    model_repository: Arc<dyn ModelRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults: JSON files on disk and no
    /// default seed.
    pub fn new() -> Self {
        Self {
            model_repository: Arc::new(JsonFileRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn model_repository(&self) -> Arc<dyn ModelRepository + Send + Sync> {
        Arc::clone(&self.model_repository)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Create an agent with an empty Q-table.
    ///
    /// A seed in `config` wins over the app default.
    pub fn create_agent(&self, config: AgentConfig) -> Result<QAgent> {
        let seed = config.seed.or(self.default_seed);
        let agent = QAgent::new(config)?;
        Ok(match seed {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }

    /// Start a new game on a validated grid.
    pub fn new_game(&self, config: GridConfig) -> Result<GameState> {
        GameState::new(config)
    }

    /// Build a training pipeline, filling in the app default seed.
    pub fn training_pipeline(
        &self,
        grid: GridConfig,
        mut config: TrainingConfig,
    ) -> TrainingPipeline {
        config.seed = config.seed.or(self.default_seed);
        TrainingPipeline::new(grid, config)
    }

    /// Save a model through the configured repository.
    ///
    /// Returns the identifier written: `destination`, or the default
    /// `{height}_{width}_{iterations}_model.json` name.
    pub fn save_model(
        &self,
        agent: &QAgent,
        state: &GameState,
        iterations: u64,
        destination: Option<&Path>,
    ) -> Result<PathBuf> {
        q_learning::save_model(
            self.model_repository.as_ref(),
            agent,
            state,
            iterations,
            destination,
        )
    }

    /// Load a model through the configured repository.
    ///
    /// The app default seed, if any, is applied to the restored agent.
    pub fn load_model(&self, path: &Path) -> Result<LoadedModel> {
        let mut model = q_learning::load_model(self.model_repository.as_ref(), path)?;
        if let Some(seed) = self.default_seed {
            model.agent.reseed(seed);
        }
        Ok(model)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    model_repository: Option<Arc<dyn ModelRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            model_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom model repository.
    pub fn with_repository<R: ModelRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.model_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents and pipelines created by the app.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app, falling back to `JsonFileRepository`.
    pub fn build(self) -> App {
        App {
            model_repository: self
                .model_repository
                .unwrap_or_else(|| Arc::new(JsonFileRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InMemoryRepository, chomp::Action};

    #[test]
    fn test_app_creates_agent() {
        let app = App::new();
        let agent = app.create_agent(AgentConfig::default()).unwrap();
        assert_eq!(agent.seed(), None);
        assert!(app.create_agent(AgentConfig::new(2.0, 0.1)).is_err());
    }

    #[test]
    fn test_config_seed_overrides_app_default() {
        let app = App::for_testing().with_default_seed(42).build();
        assert_eq!(
            app.create_agent(AgentConfig::default()).unwrap().seed(),
            Some(42)
        );
        assert_eq!(
            app.create_agent(AgentConfig::default().with_seed(123))
                .unwrap()
                .seed(),
            Some(123)
        );
    }

    #[test]
    fn test_save_and_load_through_injected_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing()
            .with_repository(repo.clone())
            .with_default_seed(7)
            .build();

        let grid = GridConfig::new(3, 4, Action::new(0, 0)).unwrap();
        let mut agent = app.create_agent(AgentConfig::default()).unwrap();
        let result = app
            .training_pipeline(
                grid,
                TrainingConfig {
                    iterations: 25,
                    ..Default::default()
                },
            )
            .run(&mut agent)
            .unwrap();

        let game = app.new_game(grid).unwrap();
        let path = app
            .save_model(&agent, &game, result.games as u64, None)
            .unwrap();
        assert_eq!(path, PathBuf::from("3_4_25_model.json"));
        assert!(repo.contains(&path));

        let loaded = app.load_model(&path).unwrap();
        assert_eq!(loaded.agent.transitions(), agent.transitions());
        assert_eq!(loaded.agent.seed(), Some(7));
        assert_eq!(loaded.state.width(), 4);
    }
}
