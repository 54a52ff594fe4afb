//! Grid representation and cell-level queries

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::GridConfig;

/// Condition of a single grid cell
///
/// Serialized as a small integer: `0 = Blank`, `1 = Used`, `2 = Poisoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Cell {
    Blank = 0,
    Used = 1,
    Poisoned = 2,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Blank => ' ',
            Cell::Used => '/',
            Cell::Poisoned => '*',
        }
    }

    /// Whether the cell can still be chosen as a move target.
    pub fn is_free(self) -> bool {
        self != Cell::Used
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell as u8
    }
}

impl TryFrom<u8> for Cell {
    type Error = crate::Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Cell::Blank),
            1 => Ok(Cell::Used),
            2 => Ok(Cell::Poisoned),
            other => Err(crate::Error::decode(format!(
                "cell code {other} is not one of 0 (blank), 1 (used), 2 (poisoned)"
            ))),
        }
    }
}

/// Upper-left corner of the region removed by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action {
    pub row: usize,
    pub col: usize,
}

impl Action {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Action {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Height x width matrix of cell conditions.
///
/// `Grid` is a value type: equality and hashing are structural over the
/// dimensions and every cell, so two snapshots with identical contents are
/// interchangeable as lookup keys. Only [`GameState`](super::GameState) mutates
/// a grid, and only by consuming cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Box<[Cell]>,
}

impl Grid {
    /// Create a fresh grid: every cell blank except the poisoned one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if `config` does not
    /// describe a playable grid.
    pub fn new(config: &GridConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::blank(config))
    }

    /// Fresh grid for a configuration that has already been validated.
    pub(super) fn blank(config: &GridConfig) -> Self {
        let mut cells = vec![Cell::Blank; config.height * config.width].into_boxed_slice();
        cells[config.poisoned.row * config.width + config.poisoned.col] = Cell::Poisoned;
        Self {
            height: config.height,
            width: config.width,
            cells,
        }
    }

    /// Rebuild a grid from row-major cell codes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the rows are ragged, do not match the
    /// expected dimensions, or contain an unknown cell code.
    pub fn from_codes(rows: &[Vec<u8>], height: usize, width: usize) -> crate::Result<Self> {
        if rows.len() != height {
            return Err(crate::Error::decode(format!(
                "state has {} rows, expected {height}",
                rows.len()
            )));
        }

        let mut cells = Vec::with_capacity(height * width);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(crate::Error::decode(format!(
                    "state row {r} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for &code in row {
                cells.push(Cell::try_from(code)?);
            }
        }

        Ok(Self {
            height,
            width,
            cells: cells.into_boxed_slice(),
        })
    }

    /// Row-major cell codes, the persisted form of a grid.
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|&c| u8::from(c)).collect())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, action: Action) -> bool {
        action.row < self.height && action.col < self.width
    }

    /// Cell at the given coordinate, `None` when out of bounds.
    pub fn get(&self, action: Action) -> Option<Cell> {
        self.contains(action)
            .then(|| self.cells[action.row * self.width + action.col])
    }

    /// Iterate over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width)
    }

    /// Every non-`Used` cell in row-major order.
    pub fn legal_actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, cell)| cell.is_free())
            .map(|(i, _)| Action::new(i / self.width, i % self.width))
    }

    pub fn has_legal_action(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_free())
    }

    /// Number of non-`Used` cells.
    pub fn free_area(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_free()).count()
    }

    /// Number of cells that would newly become `Used` if `action` were played.
    pub fn area_gain(&self, action: Action) -> usize {
        if !self.contains(action) {
            return 0;
        }
        (action.row..self.height)
            .map(|r| {
                self.cells[r * self.width + action.col..(r + 1) * self.width]
                    .iter()
                    .filter(|cell| cell.is_free())
                    .count()
            })
            .sum()
    }

    /// Mark every cell down-and-right of `action` (inclusive) as `Used`.
    pub(crate) fn consume(&mut self, action: Action) {
        for r in action.row..self.height {
            for cell in &mut self.cells[r * self.width + action.col..(r + 1) * self.width] {
                *cell = Cell::Used;
            }
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for &cell in row {
                let c = if cell == Cell::Blank { '.' } else { cell.to_char() };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
