//! Self-play training pipeline for the Q-learning agent

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    app::GridConfig,
    chomp::{Action, GameState, Grid, Player},
    ports::Observer,
    q_learning::QAgent,
};

/// Reward credited to the move that ends the game.
pub const LOSS_REWARD: f64 = -1.0;
/// Reward credited to the opponent's move just before the game-ending one.
pub const WIN_REWARD: f64 = 1.0;

/// Training configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of self-play games
    pub iterations: usize,

    /// Maximum cells a move may consume outside the endgame
    pub move_area_limit: Option<NonZeroUsize>,

    /// Multiplicative epsilon decay applied after every game (1.0 = none)
    pub epsilon_decay: f64,

    /// Floor for decayed epsilon
    pub min_epsilon: f64,

    /// Games between training statistics records
    pub stats_interval: usize,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 5000,
            move_area_limit: None,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            stats_interval: 1000,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for a zero iteration count or
    /// stats interval, or a decay outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::config("iteration count must be positive"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::config(format!(
                "epsilon decay {} must be in (0, 1]",
                self.epsilon_decay
            )));
        }
        if !(0.0..=1.0).contains(&self.min_epsilon) {
            return Err(Error::config(format!(
                "minimum epsilon {} must be in [0, 1]",
                self.min_epsilon
            )));
        }
        if self.stats_interval == 0 {
            return Err(Error::config("stats interval must be positive"));
        }
        Ok(())
    }
}

/// Summary of one finished self-play game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Game number (0-based)
    pub game_num: usize,
    pub winner: Player,
    /// Moves played
    pub plies: usize,
    /// Q-table size after the game's updates
    pub transitions: usize,
    /// Exploration rate the game was played with
    pub epsilon: f64,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total games played
    pub games: usize,

    pub player1_wins: usize,

    pub player2_wins: usize,

    /// Q-table size at the end of training
    pub transitions: usize,

    /// Mean number of moves per game
    pub average_game_length: f64,

    pub final_epsilon: f64,
}

impl TrainingResult {
    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Trains one agent by letting it play both sides of every game.
///
/// After each move the pipeline applies the delayed credit assignment the
/// reward convention needs: a game-ending move is updated with
/// [`LOSS_REWARD`] and the opponent's previous move with [`WIN_REWARD`];
/// otherwise the opponent's previous move is updated with reward 0 now that
/// its successor state is known.
///
/// # Examples
///
/// ```
/// use qchomp::{
///     app::{AgentConfig, GridConfig},
///     chomp::Action,
///     pipeline::{TrainingConfig, TrainingPipeline},
///     q_learning::QAgent,
/// };
///
/// let grid = GridConfig::new(3, 3, Action::new(0, 0))?;
/// let config = TrainingConfig { iterations: 50, seed: Some(1), ..Default::default() };
/// let mut agent = QAgent::new(AgentConfig::default())?;
///
/// let result = TrainingPipeline::new(grid, config).run(&mut agent)?;
/// assert_eq!(result.games, 50);
/// assert!(agent.transitions() > 0);
/// # Ok::<(), qchomp::Error>(())
/// ```
pub struct TrainingPipeline {
    grid: GridConfig,
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(grid: GridConfig, config: TrainingConfig) -> Self {
        Self {
            grid,
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run every configured game, updating `agent` in place.
    pub fn run(&mut self, agent: &mut QAgent) -> Result<TrainingResult> {
        self.grid.validate()?;
        self.config.validate()?;
        if let Some(seed) = self.config.seed {
            agent.reseed(seed);
        }

        info!(
            height = self.grid.height,
            width = self.grid.width,
            iterations = self.config.iterations,
            alpha = agent.learning_rate(),
            epsilon = agent.epsilon(),
            "starting training"
        );

        for observer in &mut self.observers {
            observer.on_training_start(self.config.iterations)?;
        }

        let mut player1_wins = 0;
        let mut player2_wins = 0;
        let mut total_plies = 0;
        let mut interval_start_transitions = agent.transitions();

        for game_num in 0..self.config.iterations {
            let summary = self.play_game(game_num, agent)?;
            match summary.winner {
                Player::Player1 => player1_wins += 1,
                Player::Player2 => player2_wins += 1,
            }
            total_plies += summary.plies;

            if self.config.epsilon_decay < 1.0 {
                let decayed =
                    (agent.epsilon() * self.config.epsilon_decay).max(self.config.min_epsilon);
                agent.set_epsilon(decayed)?;
            }

            for observer in &mut self.observers {
                observer.on_game_end(&summary)?;
            }

            if (game_num + 1).is_multiple_of(self.config.stats_interval) {
                debug!(
                    games = game_num + 1,
                    transitions = summary.transitions,
                    delta = summary.transitions - interval_start_transitions,
                    epsilon = summary.epsilon,
                    "training progress"
                );
                interval_start_transitions = summary.transitions;
            }
        }

        let result = TrainingResult {
            games: self.config.iterations,
            player1_wins,
            player2_wins,
            transitions: agent.transitions(),
            average_game_length: total_plies as f64 / self.config.iterations as f64,
            final_epsilon: agent.epsilon(),
        };

        for observer in &mut self.observers {
            observer.on_training_end(&result)?;
        }

        info!(
            games = result.games,
            transitions = result.transitions,
            player1_wins,
            player2_wins,
            "training finished"
        );
        Ok(result)
    }

    fn play_game(&mut self, game_num: usize, agent: &mut QAgent) -> Result<GameSummary> {
        for observer in &mut self.observers {
            observer.on_game_start(game_num)?;
        }

        let epsilon = agent.epsilon();
        let mut game = GameState::new(self.grid)?;
        // Last (state, action) of each player, indexed by player code - 1
        let mut last: [Option<(Grid, Action)>; 2] = [None, None];
        let slot = |player: Player| u8::from(player) as usize - 1;
        let mut ply = 0;

        loop {
            let player = game.current_player();
            let state = game.grid().clone();
            let action = agent
                .choose_action(&state, true, self.config.move_area_limit)
                .ok_or(Error::NoValidMoves)?;

            for observer in &mut self.observers {
                observer.on_move(game_num, ply, &state, player, action)?;
            }

            game.apply_move(action)?;
            ply += 1;

            let new_state = game.grid();
            let previous = last[slot(player.opponent())].as_ref();
            if let Some(winner) = game.winner() {
                agent.update_model(&state, action, new_state, LOSS_REWARD);
                if let Some((prev_state, prev_action)) = previous {
                    agent.update_model(prev_state, *prev_action, new_state, WIN_REWARD);
                }
                return Ok(GameSummary {
                    game_num,
                    winner,
                    plies: ply,
                    transitions: agent.transitions(),
                    epsilon,
                });
            }
            if let Some((prev_state, prev_action)) = previous {
                agent.update_model(prev_state, *prev_action, new_state, 0.0);
            }

            last[slot(player)] = Some((state, action));
        }
    }
}
