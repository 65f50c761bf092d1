use std::collections::BTreeSet;

use crate::core::board::{Board, Stone};
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{Threat, ThreatKind, ThreatResult};

/// Outcome of a forced-four search. `sequence` holds both players' moves;
/// `depth` is the sequence length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcfResult {
    pub found: bool,
    pub sequence: Vec<(usize, usize, Stone)>,
    pub depth: usize,
}

impl VcfResult {
    pub fn not_found() -> Self {
        Self { found: false, sequence: Vec::new(), depth: 0 }
    }

    fn found(sequence: Vec<(usize, usize, Stone)>) -> Self {
        let depth = sequence.len();
        Self { found: true, sequence, depth }
    }
}

/// A candidate forcing move together with the threat it creates.
#[derive(Clone, Debug)]
pub(crate) struct ForcingMove {
    pub row: usize,
    pub col: usize,
    pub kind: ThreatKind,
    pub threat: Threat,
}

/// Victory by Continuous Fours: depth-first search over moves that create a
/// four-type threat, with the defender forced to answer each one, ending in
/// a five. Enumeration order is fixed (threat priority, then coordinates) so
/// returned sequences are reproducible.
pub struct VcfSearch {
    max_depth: usize,
    nodes: u64,
}

impl VcfSearch {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth, nodes: 0 }
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes
    }

    pub fn search(&mut self, board: &Board, attacker: Stone) -> VcfResult {
        self.nodes = 0;
        let defender = attacker.opponent();
        let mut board = board.clone();

        let defender_threats = ThreatDetector::detect(&board, defender);
        if defender_threats.has(ThreatKind::Five) {
            return VcfResult::not_found();
        }

        let attacker_threats = ThreatDetector::detect(&board, attacker);
        if attacker_threats.has(ThreatKind::Five) {
            return VcfResult { found: true, sequence: Vec::new(), depth: 0 };
        }
        if attacker_threats.has(ThreatKind::OpenFour) {
            if let Some((row, col)) = Self::open_four_completion(&board, &attacker_threats) {
                return VcfResult::found(vec![(row, col, attacker)]);
            }
        }

        if defender_threats.has(ThreatKind::OpenFour) {
            // The open four wins for the defender unless the attacker's very
            // first move completes a five.
            let moves = Self::four_creating_moves(&mut board, attacker);
            if let Some(win) = moves.iter().find(|m| m.kind == ThreatKind::Five) {
                return VcfResult::found(vec![(win.row, win.col, attacker)]);
            }
            return VcfResult::not_found();
        }

        let mut sequence = Vec::new();
        if self.dfs(&mut board, attacker, defender, 0, &mut sequence) {
            VcfResult::found(sequence)
        } else {
            VcfResult::not_found()
        }
    }

    fn dfs(
        &mut self,
        board: &mut Board,
        attacker: Stone,
        defender: Stone,
        depth: usize,
        sequence: &mut Vec<(usize, usize, Stone)>,
    ) -> bool {
        self.nodes += 1;
        if depth >= self.max_depth {
            return false;
        }

        let moves = Self::four_creating_moves(board, attacker);

        for mv in moves {
            board.place(mv.row, mv.col, attacker);
            sequence.push((mv.row, mv.col, attacker));

            // A five wins outright; an open four cannot be answered.
            if matches!(mv.kind, ThreatKind::Five | ThreatKind::OpenFour) {
                return true;
            }

            let blocks = ThreatDetector::extension_cells(board, &mv.threat);
            if blocks.is_empty() {
                return true;
            }

            let mut branch_won = false;
            for (block_row, block_col) in blocks {
                board.place(block_row, block_col, defender);
                sequence.push((block_row, block_col, defender));

                // A block that creates a defender open four turns the tables.
                let defender_threats = ThreatDetector::detect(board, defender);
                if defender_threats.has(ThreatKind::OpenFour) {
                    board.remove(block_row, block_col);
                    sequence.pop();
                    continue;
                }

                if self.dfs(board, attacker, defender, depth + 2, sequence) {
                    branch_won = true;
                    break;
                }

                board.remove(block_row, block_col);
                sequence.pop();
            }

            if branch_won {
                return true;
            }

            board.remove(mv.row, mv.col);
            sequence.pop();
        }

        false
    }

    /// Moves creating a new five / open-four / four / broken-four, ordered
    /// by threat priority and then coordinates.
    pub(crate) fn four_creating_moves(board: &mut Board, attacker: Stone) -> Vec<ForcingMove> {
        let current = ThreatDetector::detect(board, attacker);
        let mut moves = Vec::new();

        for (row, col) in Self::candidates(board, attacker) {
            board.place(row, col, attacker);
            let after = ThreatDetector::detect(board, attacker);

            for kind in [
                ThreatKind::Five,
                ThreatKind::OpenFour,
                ThreatKind::Four,
                ThreatKind::BrokenFour,
            ] {
                if let Some(threat) = Self::new_threat_of_kind(&after, &current, kind) {
                    moves.push(ForcingMove { row, col, kind, threat });
                    break;
                }
            }

            board.remove(row, col);
        }

        moves.sort_by_key(|m| (m.kind.table_index(), m.row, m.col));
        moves
    }

    /// Empty cells within a two-cell radius of any attacker stone, in
    /// coordinate order.
    pub(crate) fn candidates(board: &Board, attacker: Stone) -> Vec<(usize, usize)> {
        let mut cells = BTreeSet::new();
        for (row, col, stone) in board.stones() {
            if stone != attacker {
                continue;
            }
            for dr in -2isize..=2 {
                for dc in -2isize..=2 {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if Board::in_bounds(nr, nc) && board.is_empty_at(nr as usize, nc as usize) {
                        cells.insert((nr as usize, nc as usize));
                    }
                }
            }
        }
        cells.into_iter().collect()
    }

    /// First threat of `kind` in `after` whose position set is not already
    /// present in `current`.
    pub(crate) fn new_threat_of_kind(
        after: &ThreatResult,
        current: &ThreatResult,
        kind: ThreatKind,
    ) -> Option<Threat> {
        if !after.has(kind) {
            return None;
        }
        after
            .threats
            .iter()
            .find(|t| t.kind == kind && !Self::threat_existed(t, current))
            .cloned()
    }

    fn threat_existed(threat: &Threat, current: &ThreatResult) -> bool {
        let mut positions = threat.positions.clone();
        positions.sort_unstable();
        current.threats.iter().any(|existing| {
            if existing.kind != threat.kind {
                return false;
            }
            let mut other = existing.positions.clone();
            other.sort_unstable();
            other == positions
        })
    }

    /// Either open end of an existing open four completes the five.
    pub(crate) fn open_four_completion(
        board: &Board,
        threats: &ThreatResult,
    ) -> Option<(usize, usize)> {
        threats
            .threats
            .iter()
            .filter(|t| t.kind == ThreatKind::OpenFour)
            .find_map(|t| ThreatDetector::extension_cells(board, t).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(usize, usize, Stone)]) -> Board {
        let mut board = Board::new();
        for &(row, col, stone) in stones {
            board.place(row, col, stone);
        }
        board
    }

    #[test]
    fn test_open_four_wins_immediately() {
        let board = board_with(&[
            (7, 4, Stone::X),
            (7, 5, Stone::X),
            (7, 6, Stone::X),
            (7, 7, Stone::X),
        ]);
        let result = VcfSearch::new(20).search(&board, Stone::X);
        assert!(result.found);
        assert_eq!(result.depth, 1);
        let (row, col, stone) = result.sequence[0];
        assert_eq!(stone, Stone::X);
        assert!((row, col) == (7, 3) || (row, col) == (7, 8));
    }

    #[test]
    fn test_defender_five_blocks_search() {
        let mut stones: Vec<_> = (0..5).map(|i| (0, i, Stone::O)).collect();
        stones.push((7, 7, Stone::X));
        stones.push((7, 8, Stone::X));
        stones.push((7, 9, Stone::X));
        let board = board_with(&stones);
        let result = VcfSearch::new(20).search(&board, Stone::X);
        assert!(!result.found);
    }

    #[test]
    fn test_defender_open_four_blocks_search() {
        let board = board_with(&[
            (2, 4, Stone::O),
            (2, 5, Stone::O),
            (2, 6, Stone::O),
            (2, 7, Stone::O),
            (7, 7, Stone::X),
            (7, 8, Stone::X),
            (7, 9, Stone::X),
        ]);
        let result = VcfSearch::new(20).search(&board, Stone::X);
        assert!(!result.found);
    }

    #[test]
    fn test_no_vcf_on_quiet_position() {
        let board = board_with(&[(7, 7, Stone::X), (8, 8, Stone::O)]);
        let result = VcfSearch::new(8).search(&board, Stone::X);
        assert!(!result.found);
    }

    #[test]
    fn test_sequence_is_reproducible() {
        let board = board_with(&[
            (7, 7, Stone::X),
            (8, 7, Stone::X),
            (9, 7, Stone::X),
            (10, 7, Stone::O),
            (8, 6, Stone::O),
        ]);
        let first = VcfSearch::new(20).search(&board, Stone::X);
        let second = VcfSearch::new(20).search(&board, Stone::X);
        assert_eq!(first, second);
    }
}
