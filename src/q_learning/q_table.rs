//! Q-table implementation for temporal difference learning

use std::collections::HashMap;

use crate::chomp::{Action, Grid};

/// Q-table mapping (grid snapshot, action) pairs to Q-values
///
/// Keys compare by grid contents, never by identity. Entries are grouped per
/// grid so a lookup hashes the grid once and borrows it, which keeps the
/// per-move maximum over all actions cheap.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    q_values: HashMap<Grid, HashMap<Action, f64>>,
    len: usize,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair, `0.0` when never written
    pub fn get(&self, state: &Grid, action: Action) -> f64 {
        self.q_values
            .get(state)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair, overwriting any previous value
    pub fn set(&mut self, state: &Grid, action: Action, value: f64) {
        if let Some(actions) = self.q_values.get_mut(state) {
            if actions.insert(action, value).is_none() {
                self.len += 1;
            }
            return;
        }
        self.q_values
            .entry(state.clone())
            .or_default()
            .insert(action, value);
        self.len += 1;
    }

    /// Maximum Q-value over the legal actions of `state`, `None` if there are none
    pub fn max_q(&self, state: &Grid) -> Option<f64> {
        let known = self.q_values.get(state);
        state
            .legal_actions()
            .map(|action| {
                known
                    .and_then(|actions| actions.get(&action))
                    .copied()
                    .unwrap_or(0.0)
            })
            .reduce(f64::max)
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.len
    }

    /// Number of distinct grid snapshots with at least one Q-value
    pub fn state_count(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over every stored (state, action, value) triple
    pub fn iter(&self) -> impl Iterator<Item = (&Grid, Action, f64)> + '_ {
        self.q_values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(&action, &value)| (state, action, value))
        })
    }

    /// Reset all Q-values
    pub fn reset(&mut self) {
        self.q_values.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GridConfig;

    fn empty_grid() -> Grid {
        Grid::new(&GridConfig::new(3, 3, Action::new(0, 0)).unwrap()).unwrap()
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new();
        assert_eq!(qtable.get(&empty_grid(), Action::new(0, 0)), 0.0);
        assert_eq!(qtable.size(), 0);
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new();
        let state = empty_grid();
        qtable.set(&state, Action::new(1, 2), 1.5);
        assert_eq!(qtable.get(&state, Action::new(1, 2)), 1.5);
        assert_eq!(qtable.get(&state, Action::new(2, 1)), 0.0);
    }

    #[test]
    fn test_overwrite_keeps_size() {
        let mut qtable = QTable::new();
        let state = empty_grid();
        qtable.set(&state, Action::new(1, 1), 0.25);
        qtable.set(&state, Action::new(1, 1), -0.75);
        assert_eq!(qtable.size(), 1);
        assert_eq!(qtable.get(&state, Action::new(1, 1)), -0.75);
    }

    #[test]
    fn test_lookup_by_structurally_equal_grid() {
        let mut qtable = QTable::new();
        let mut a = empty_grid();
        a.consume(Action::new(2, 2));
        qtable.set(&a, Action::new(0, 1), 0.5);

        let mut b = empty_grid();
        b.consume(Action::new(2, 2));
        assert_eq!(qtable.get(&b, Action::new(0, 1)), 0.5);
        assert_eq!(qtable.state_count(), 1);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = QTable::new();
        let state = empty_grid();
        qtable.set(&state, Action::new(0, 1), -0.5);
        qtable.set(&state, Action::new(1, 1), 1.5);
        qtable.set(&state, Action::new(2, 2), 0.8);
        assert_eq!(qtable.max_q(&state), Some(1.5));

        let mut all_negative = QTable::new();
        all_negative.set(&state, Action::new(0, 0), -1.0);
        // Unvisited actions still count as 0.0
        assert_eq!(all_negative.max_q(&state), Some(0.0));
    }

    #[test]
    fn test_max_q_without_legal_actions() {
        let mut state = empty_grid();
        state.consume(Action::new(0, 0));
        assert_eq!(QTable::new().max_q(&state), None);
    }

    #[test]
    fn test_iter_and_reset() {
        let mut qtable = QTable::new();
        let state = empty_grid();
        qtable.set(&state, Action::new(0, 1), 1.0);
        qtable.set(&state, Action::new(1, 0), 2.0);
        let total: f64 = qtable.iter().map(|(_, _, v)| v).sum();
        assert_eq!(total, 3.0);
        qtable.reset();
        assert!(qtable.is_empty());
    }
}
