//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use crate::{
    Result,
    chomp::{Action, Grid, Player},
    pipeline::{GameSummary, TrainingResult},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - Periodic training statistics for later analysis
/// - Structured log lines
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_games)` - Once at the beginning
/// 2. For each game:
///    - `on_game_start(game_num)`
///    - `on_move(...)` - For each move in the game
///    - `on_game_end(summary)`
/// 3. `on_training_end(result)` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use qchomp::{pipeline::GameSummary, ports::Observer};
///
/// struct GameCounter {
///     games: usize,
/// }
///
/// impl Observer for GameCounter {
///     fn on_game_end(&mut self, _summary: &GameSummary) -> qchomp::Result<()> {
///         self.games += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_games: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a game starts. `game_num` is 0-based.
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        Ok(())
    }

    /// Called for each move, after it is chosen and before it is applied.
    ///
    /// # Parameters
    ///
    /// * `game_num` - Index of the current game
    /// * `ply` - Move number within the game (0-based)
    /// * `state` - Grid before the move
    /// * `player` - Player making the move
    /// * `action` - Chosen action
    fn on_move(
        &mut self,
        _game_num: usize,
        _ply: usize,
        _state: &Grid,
        _player: Player,
        _action: Action,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when a game ends, after all learning updates for it are applied.
    fn on_game_end(&mut self, _summary: &GameSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// This is the last method called in the observation lifecycle.
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self, _result: &TrainingResult) -> Result<()> {
        Ok(())
    }
}
