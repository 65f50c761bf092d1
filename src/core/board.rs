use serde::{Deserialize, Serialize};

use crate::core::coords::BOARD_SIZE;

pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stone {
    X,
    O,
}

impl Stone {
    pub fn opponent(&self) -> Stone {
        match self {
            Stone::X => Stone::O,
            Stone::O => Stone::X,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Stone::X => 0,
            Stone::O => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    OutOfBounds { row: usize, col: usize },
    Occupied { row: usize, col: usize },
    /// Stone counts cannot arise from alternating play.
    ImpossibleCounts { x_stones: usize, o_stones: usize },
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::OutOfBounds { row, col } => {
                write!(f, "cell ({row}, {col}) is outside the 15x15 board")
            }
            BoardError::Occupied { row, col } => {
                write!(f, "cell ({row}, {col}) is already occupied")
            }
            BoardError::ImpossibleCounts { x_stones, o_stones } => {
                write!(f, "impossible position: {x_stones} X stones vs {o_stones} O stones")
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// 15x15 grid as a flat array of cell tags. Row 0 is the bottom row
/// (notation row "1"), column 0 is column "A".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Stone>; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self { cells: [None; BOARD_CELLS] }
    }

    #[inline(always)]
    pub fn index(row: usize, col: usize) -> usize {
        row * BOARD_SIZE + col
    }

    #[inline(always)]
    pub fn in_bounds(row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Stone> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            self.cells[Self::index(row, col)]
        } else {
            None
        }
    }

    #[inline]
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        row < BOARD_SIZE && col < BOARD_SIZE && self.cells[Self::index(row, col)].is_none()
    }

    pub fn try_place(&mut self, row: usize, col: usize, stone: Stone) -> Result<(), BoardError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(BoardError::OutOfBounds { row, col });
        }
        let idx = Self::index(row, col);
        if self.cells[idx].is_some() {
            return Err(BoardError::Occupied { row, col });
        }
        self.cells[idx] = Some(stone);
        Ok(())
    }

    /// Place without occupancy checks. Search code owns its candidates and
    /// always reverts with `remove`.
    #[inline]
    pub fn place(&mut self, row: usize, col: usize, stone: Stone) {
        self.cells[Self::index(row, col)] = Some(stone);
    }

    #[inline]
    pub fn remove(&mut self, row: usize, col: usize) {
        self.cells[Self::index(row, col)] = None;
    }

    pub fn clear(&mut self) {
        self.cells = [None; BOARD_CELLS];
    }

    pub fn stone_count(&self, stone: Stone) -> usize {
        self.cells.iter().filter(|c| **c == Some(stone)).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }

    /// Iterate occupied cells as (row, col, stone).
    pub fn stones(&self) -> impl Iterator<Item = (usize, usize, Stone)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, c)| {
            c.map(|stone| (i / BOARD_SIZE, i % BOARD_SIZE, stone))
        })
    }

    /// Count occupied cells adjacent to (row, col), diagonals included.
    pub fn neighbor_count(&self, row: usize, col: usize) -> usize {
        let mut count = 0;
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if Self::in_bounds(nr, nc) && !self.is_empty_at(nr as usize, nc as usize) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn is_adjacent_to_stone(&self, row: usize, col: usize) -> bool {
        self.neighbor_count(row, col) > 0
    }

    /// Reject positions that cannot arise from alternating play.
    pub fn validate(&self) -> Result<(), BoardError> {
        let x_stones = self.stone_count(Stone::X);
        let o_stones = self.stone_count(Stone::O);
        let diff = x_stones.abs_diff(o_stones);
        if diff > 1 {
            return Err(BoardError::ImpossibleCounts { x_stones, o_stones });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove_round_trip() {
        let mut board = Board::new();
        board.place(7, 7, Stone::X);
        assert_eq!(board.get(7, 7), Some(Stone::X));
        board.remove(7, 7);
        assert!(board.is_empty_at(7, 7));
        assert!(board.is_empty());
    }

    #[test]
    fn test_try_place_rejects_occupied() {
        let mut board = Board::new();
        board.try_place(3, 4, Stone::O).unwrap();
        let err = board.try_place(3, 4, Stone::X).unwrap_err();
        assert_eq!(err, BoardError::Occupied { row: 3, col: 4 });
    }

    #[test]
    fn test_validate_impossible_counts() {
        let mut board = Board::new();
        board.place(0, 0, Stone::X);
        board.place(0, 1, Stone::X);
        board.place(0, 2, Stone::X);
        assert!(board.validate().is_err());
        board.place(1, 0, Stone::O);
        board.place(1, 1, Stone::O);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_neighbor_count() {
        let mut board = Board::new();
        board.place(7, 7, Stone::X);
        board.place(7, 8, Stone::O);
        assert_eq!(board.neighbor_count(7, 6), 1);
        assert_eq!(board.neighbor_count(8, 7), 2);
        assert_eq!(board.neighbor_count(0, 0), 0);
    }
}
