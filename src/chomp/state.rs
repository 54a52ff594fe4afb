//! Game state: grid, turn order and winner detection

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::grid::{Action, Cell, Grid};
use crate::{Error, Result, app::GridConfig};

/// A player in the game
///
/// Serialized as `1 = Player1`, `2 = Player2`; an absent winner is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Player {
    Player1 = 1,
    Player2 = 2,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player as u8
    }
}

impl TryFrom<u8> for Player {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Player::Player1),
            2 => Ok(Player::Player2),
            other => Err(Error::decode(format!("player code {other} is not 1 or 2"))),
        }
    }
}

/// Complete state of one Chomp game.
///
/// The grid only ever loses cells: [`apply_move`](Self::apply_move) marks the
/// chosen cell and everything below-right of it as used, then hands the turn to
/// the opponent. When no free cell remains, the player now on turn is recorded
/// as the winner and the state rejects further moves. Use
/// [`reset`](Self::reset) to start over on the same board.
///
/// # Examples
///
/// ```
/// use qchomp::{app::GridConfig, chomp::{Action, GameState, Player}};
///
/// let mut game = GameState::new(GridConfig::new(2, 2, Action::new(0, 0))?)?;
/// game.apply_move(Action::new(1, 0))?;
/// game.apply_move(Action::new(0, 1))?;
/// game.apply_move(Action::new(0, 0))?;
/// assert_eq!(game.winner(), Some(Player::Player2));
/// # Ok::<(), qchomp::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    config: GridConfig,
    grid: Grid,
    current_player: Player,
    winner: Option<Player>,
}

impl GameState {
    /// Start a new game with Player1 to move.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a dimension is outside
    /// `[2, 20]` or the poisoned cell lies outside the grid.
    pub fn new(config: GridConfig) -> Result<Self> {
        Ok(Self::fresh(config, Grid::new(&config)?))
    }

    fn fresh(config: GridConfig, grid: Grid) -> Self {
        Self {
            grid,
            config,
            current_player: Player::Player1,
            winner: None,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn poisoned(&self) -> Action {
        self.config.poisoned
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    /// Every legal action in uniformly shuffled order.
    ///
    /// Callers that take the first or last element get a uniformly random
    /// legal action, which keeps greedy tie-breaking unbiased.
    pub fn available_actions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Action> {
        shuffled_actions(&self.grid, rng)
    }

    /// Play `action` for the current player.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GameOver`] if a winner is already set, and
    /// [`Error::InvalidMove`] if the cell is out of bounds or already used.
    pub fn apply_move(&mut self, action: Action) -> Result<()> {
        if self.winner.is_some() {
            return Err(Error::GameOver);
        }
        match self.grid.get(action) {
            None => {
                return Err(Error::InvalidMove {
                    row: action.row,
                    col: action.col,
                    reason: format!(
                        "outside the {}x{} grid",
                        self.grid.height(),
                        self.grid.width()
                    ),
                });
            }
            Some(Cell::Used) => {
                return Err(Error::InvalidMove {
                    row: action.row,
                    col: action.col,
                    reason: "cell is already used".to_string(),
                });
            }
            Some(_) => {}
        }

        self.grid.consume(action);
        self.current_player = self.current_player.opponent();

        // The player left without a move is recorded as the winner.
        if !self.grid.has_legal_action() {
            self.winner = Some(self.current_player);
        }
        Ok(())
    }

    /// Restore the starting position on the same board.
    pub fn reset(&mut self) {
        *self = Self::fresh(self.config, Grid::blank(&self.config));
    }
}

/// Shuffled legal actions of an arbitrary grid snapshot.
pub fn shuffled_actions<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Vec<Action> {
    let mut actions: Vec<Action> = grid.legal_actions().collect();
    actions.shuffle(rng);
    actions
}
