//! ASCII rendering and move notation
//!
//! Moves are written as a column letter followed by a 1-based row number,
//! so `B3` names row 2, column 1.

use std::fmt::Write;

use super::grid::{Action, Grid};
use crate::{Error, Result};

/// Render the grid as a bordered ASCII table with lettered columns.
///
/// ```text
///      A   B   C
///    |---|---|---|
/// 1  | * |   |   |
///    |---|---|---|
/// 2  |   |   | / |
///    |---|---|---|
/// ```
pub fn format_grid(grid: &Grid) -> String {
    let mut out = String::from("     ");
    for letter in column_letters().take(grid.width()) {
        let _ = write!(out, "{letter}   ");
    }
    out.truncate(out.trim_end().len());
    out.push('\n');

    let divider = format!("   {}|\n", "|---".repeat(grid.width()));
    out.push_str(&divider);
    for (r, row) in grid.rows().enumerate() {
        let _ = write!(out, "{:<3}|", r + 1);
        for cell in row {
            let _ = write!(out, " {} |", cell.to_char());
        }
        out.push('\n');
        out.push_str(&divider);
    }
    out
}

/// Format an action in move notation.
pub fn format_move(action: Action) -> String {
    let letter = column_letters().nth(action.col).unwrap_or('?');
    format!("{letter}{}", action.row + 1)
}

/// Parse move notation such as `b3` or `C12` against the grid bounds.
///
/// # Errors
///
/// Returns [`Error::InvalidMoveNotation`] if the text is malformed or names a
/// cell outside the grid. Whether the cell is still free is left to
/// [`GameState::apply_move`](super::GameState::apply_move).
pub fn parse_move(input: &str, grid: &Grid) -> Result<Action> {
    let trimmed = input.trim();
    let invalid = |reason: String| Error::InvalidMoveNotation {
        input: input.to_string(),
        reason,
    };

    let mut chars = trimmed.chars();
    let letter = chars
        .next()
        .ok_or_else(|| invalid("empty input".to_string()))?
        .to_ascii_uppercase();
    if !letter.is_ascii_uppercase() {
        return Err(invalid("expected a column letter first".to_string()));
    }
    let col = (letter as u8 - b'A') as usize;

    let row: usize = chars
        .as_str()
        .parse()
        .map_err(|_| invalid("expected a row number after the column".to_string()))?;
    if row == 0 {
        return Err(invalid("rows are numbered from 1".to_string()));
    }

    let action = Action::new(row - 1, col);
    if !grid.contains(action) {
        return Err(invalid(format!(
            "outside the {}x{} grid",
            grid.height(),
            grid.width()
        )));
    }
    Ok(action)
}

fn column_letters() -> impl Iterator<Item = char> {
    'A'..='Z'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GridConfig;

    fn grid() -> Grid {
        Grid::new(&GridConfig::new(3, 4, Action::new(0, 0)).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_move() {
        let g = grid();
        assert_eq!(parse_move("A1", &g).unwrap(), Action::new(0, 0));
        assert_eq!(parse_move(" d3 ", &g).unwrap(), Action::new(2, 3));
        assert!(parse_move("E1", &g).is_err());
        assert!(parse_move("A4", &g).is_err());
        assert!(parse_move("A0", &g).is_err());
        assert!(parse_move("11", &g).is_err());
        assert!(parse_move("", &g).is_err());
    }

    #[test]
    fn test_format_move_matches_parse() {
        let g = grid();
        let action = Action::new(2, 1);
        assert_eq!(format_move(action), "B3");
        assert_eq!(parse_move(&format_move(action), &g).unwrap(), action);
    }

    #[test]
    fn test_format_grid_layout() {
        let mut g = grid();
        g.consume(Action::new(1, 3));
        let text = format_grid(&g);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "     A   B   C   D");
        assert_eq!(lines[1], "   |---|---|---|---|");
        assert_eq!(lines[2], "1  | * |   |   |   |");
        assert_eq!(lines[4], "2  |   |   |   | / |");
        assert_eq!(lines.len(), 1 + 1 + 3 * 2);
    }
}
