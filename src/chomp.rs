//! Chomp game implementation

pub mod grid;
pub mod render;
pub mod state;

pub use grid::{Action, Cell, Grid};
pub use render::{format_grid, format_move, parse_move};
pub use state::{GameState, Player, shuffled_actions};
