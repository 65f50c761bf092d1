use serde::{Deserialize, Serialize};

use crate::core::board::Board;
use crate::core::coords::BOARD_SIZE;

/// The four line orientations a pattern can lie on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Horizontal,
    Vertical,
    /// Towards higher row and higher column.
    DiagDown,
    /// Towards higher row and lower column.
    DiagUp,
}

pub const DIRECTIONS: [Direction; 4] = [
    Direction::Horizontal,
    Direction::Vertical,
    Direction::DiagDown,
    Direction::DiagUp,
];

impl Direction {
    #[inline]
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::DiagDown => (1, 1),
            Direction::DiagUp => (1, -1),
        }
    }

    /// Minimal set of starting cells covering every maximal line in this
    /// direction.
    pub fn line_starts(&self) -> Vec<(usize, usize)> {
        let n = BOARD_SIZE;
        let mut starts = Vec::new();
        match self {
            Direction::Horizontal => {
                for row in 0..n {
                    starts.push((row, 0));
                }
            }
            Direction::Vertical => {
                for col in 0..n {
                    starts.push((0, col));
                }
            }
            Direction::DiagDown => {
                for col in 0..n {
                    starts.push((0, col));
                }
                for row in 1..n {
                    starts.push((row, 0));
                }
            }
            Direction::DiagUp => {
                for col in 0..n {
                    starts.push((0, col));
                }
                for row in 1..n {
                    starts.push((row, n - 1));
                }
            }
        }
        starts
    }
}

/// Collect the cells of the maximal line through (start_row, start_col) in
/// the given direction, as (row, col, cell).
pub fn collect_line(
    board: &Board,
    start_row: usize,
    start_col: usize,
    direction: Direction,
) -> Vec<(usize, usize, Option<crate::core::board::Stone>)> {
    let (dr, dc) = direction.delta();
    let mut line = Vec::with_capacity(BOARD_SIZE);
    let mut row = start_row as isize;
    let mut col = start_col as isize;
    while Board::in_bounds(row, col) {
        let (r, c) = (row as usize, col as usize);
        line.push((r, c, board.get(r, c)));
        row += dr;
        col += dc;
    }
    line
}

/// Direction implied by two cells of the same line, if they are collinear
/// along one of the four scan orientations.
pub fn direction_between(a: (usize, usize), b: (usize, usize)) -> Option<Direction> {
    let dr = b.0 as isize - a.0 as isize;
    let dc = b.1 as isize - a.1 as isize;
    if dr == 0 && dc != 0 {
        Some(Direction::Horizontal)
    } else if dc == 0 && dr != 0 {
        Some(Direction::Vertical)
    } else if dr == dc && dr != 0 {
        Some(Direction::DiagDown)
    } else if dr == -dc && dr != 0 {
        Some(Direction::DiagUp)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Stone;

    #[test]
    fn test_line_start_coverage() {
        // Every cell must be covered by exactly one line per direction.
        for direction in DIRECTIONS {
            let board = Board::new();
            let mut seen = std::collections::HashSet::new();
            for (row, col) in direction.line_starts() {
                for (r, c, _) in collect_line(&board, row, col, direction) {
                    assert!(seen.insert((r, c)), "{direction:?} covers ({r}, {c}) twice");
                }
            }
            assert_eq!(seen.len(), BOARD_SIZE * BOARD_SIZE);
        }
    }

    #[test]
    fn test_collect_line_contents() {
        let mut board = Board::new();
        board.place(0, 2, Stone::X);
        let line = collect_line(&board, 0, 0, Direction::Horizontal);
        assert_eq!(line.len(), BOARD_SIZE);
        assert_eq!(line[2], (0, 2, Some(Stone::X)));
    }

    #[test]
    fn test_direction_between() {
        assert_eq!(direction_between((3, 3), (3, 7)), Some(Direction::Horizontal));
        assert_eq!(direction_between((3, 3), (6, 3)), Some(Direction::Vertical));
        assert_eq!(direction_between((3, 3), (5, 5)), Some(Direction::DiagDown));
        assert_eq!(direction_between((5, 3), (3, 5)), Some(Direction::DiagUp));
        assert_eq!(direction_between((3, 3), (4, 6)), None);
    }
}
