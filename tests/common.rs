//! Common test utilities for the qchomp test suite.

#![allow(dead_code)]

use qchomp::{
    app::{AgentConfig, GridConfig},
    chomp::{Action, GameState},
    q_learning::QAgent,
};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

/// Grid with the poisoned cell in the top-left corner.
pub fn grid(height: usize, width: usize) -> GridConfig {
    GridConfig::new(height, width, Action::new(0, 0)).unwrap()
}

/// Agent with a fixed seed.
pub fn seeded_agent(alpha: f64, epsilon: f64, seed: u64) -> QAgent {
    QAgent::new(AgentConfig::new(alpha, epsilon).with_seed(seed)).unwrap()
}

/// Play uniformly random legal moves until the game ends, returning every
/// intermediate state (including the initial and final one).
pub fn random_playout(config: GridConfig, seed: u64) -> Vec<GameState> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = GameState::new(config).unwrap();
    let mut history = vec![game.clone()];
    while game.winner().is_none() {
        let actions: Vec<Action> = game.grid().legal_actions().collect();
        let action = *actions.choose(&mut rng).unwrap();
        game.apply_move(action).unwrap();
        history.push(game.clone());
    }
    history
}
