//! Q-learning agent
//!
//! The agent keeps a [`QTable`] of state-action values, chooses moves with an
//! ε-greedy policy, and learns from one-step temporal difference updates.

use std::num::NonZeroUsize;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    app::AgentConfig,
    chomp::{Action, Grid, shuffled_actions},
    q_learning::q_table::QTable,
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Tabular Q-learning agent (off-policy TD control)
///
/// # Examples
///
/// ```
/// use qchomp::{
///     app::{AgentConfig, GridConfig},
///     chomp::{Action, GameState},
///     q_learning::QAgent,
/// };
///
/// let mut agent = QAgent::new(AgentConfig::new(0.5, 0.1).with_seed(7))?;
/// let game = GameState::new(GridConfig::new(3, 3, Action::new(0, 0))?)?;
///
/// let action = agent.choose_action(game.grid(), true, None).unwrap();
/// assert!(game.grid().get(action).is_some_and(|cell| cell.is_free()));
/// # Ok::<(), qchomp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct QAgent {
    q_table: QTable,
    alpha: f64,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QAgent {
    /// Create an agent with an empty Q-table
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if α or ε is out of range.
    pub fn new(config: AgentConfig) -> Result<Self> {
        Self::from_table(config, QTable::new())
    }

    pub(crate) fn from_table(config: AgentConfig, q_table: QTable) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table,
            alpha: config.alpha,
            epsilon: config.epsilon,
            rng: build_rng(config.seed),
            rng_seed: config.seed,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    /// Restart the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    pub fn learning_rate(&self) -> f64 {
        self.alpha
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Change the exploration probability (used for per-game decay).
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::config(format!("epsilon {epsilon} must be in [0, 1]")));
        }
        self.epsilon = epsilon;
        Ok(())
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub fn config(&self) -> AgentConfig {
        AgentConfig {
            alpha: self.alpha,
            epsilon: self.epsilon,
            seed: self.rng_seed,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Number of state-action values learned so far
    pub fn transitions(&self) -> usize {
        self.q_table.size()
    }

    /// Pick an action for `state`, or `None` if no legal action exists.
    ///
    /// With probability ε (only when `explore` is set) the action is drawn
    /// uniformly; otherwise the highest-valued action wins, ties resolving to a
    /// uniformly random member of the best set. A `move_area_limit` restricts
    /// both branches to actions that would consume at most that many cells,
    /// except once the free area has shrunk to `height + width - 1` or less.
    /// A free cell with nothing free below or to its right always gains one
    /// cell, so a limit never empties the choice on a non-terminal grid.
    pub fn choose_action(
        &mut self,
        state: &Grid,
        explore: bool,
        move_area_limit: Option<NonZeroUsize>,
    ) -> Option<Action> {
        let actions = shuffled_actions(state, &mut self.rng);
        if actions.is_empty() {
            return None;
        }

        let endgame = state.free_area() <= state.height() + state.width() - 1;
        let limit = move_area_limit.filter(|_| !endgame);
        let within_limit =
            |action: Action| limit.is_none_or(|limit| state.area_gain(action) <= limit.get());

        if explore && self.rng.random::<f64>() < self.epsilon {
            let candidates: Vec<Action> = actions
                .into_iter()
                .filter(|&action| within_limit(action))
                .collect();
            return candidates.choose(&mut self.rng).copied();
        }

        let mut best = None;
        let mut max_value = f64::NEG_INFINITY;
        for action in actions {
            if !within_limit(action) {
                continue;
            }
            let value = self.q_table.get(state, action);
            // `>=` lets later ties replace earlier ones; the shuffle makes that random
            if value >= max_value {
                max_value = value;
                best = Some(action);
            }
        }
        best
    }

    /// Best value reachable from `state`, `0.0` when no action is left.
    pub fn best_future_reward(&self, state: &Grid) -> f64 {
        self.q_table.max_q(state).unwrap_or(0.0)
    }

    /// Temporal difference update
    ///
    /// Q(s,a) ← Q(s,a) + α[r + max_a' Q(s',a') - Q(s,a)]
    pub fn update_model(&mut self, old_state: &Grid, action: Action, new_state: &Grid, reward: f64) {
        let old_value = self.q_table.get(old_state, action);
        let future = self.best_future_reward(new_state);
        let new_value = old_value + self.alpha * (reward + future - old_value);
        self.q_table.set(old_state, action, new_value);
    }

    /// Legal actions of `state` with their values, best first.
    pub fn action_values(&self, state: &Grid) -> Vec<(Action, f64)> {
        let mut values: Vec<(Action, f64)> = state
            .legal_actions()
            .map(|action| (action, self.q_table.get(state, action)))
            .collect();
        values.sort_by(|(a1, v1), (a2, v2)| v2.total_cmp(v1).then(a1.cmp(a2)));
        values
    }

    /// Forget everything learned and restart the random stream.
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.rng = build_rng(self.rng_seed);
    }
}
