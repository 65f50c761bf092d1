use serde::{Deserialize, Serialize};

use crate::core::board::{Board, Stone};
use crate::search::vcf::{VcfSearch, VcfResult};
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{Threat, ThreatKind};

/// Kind of attacker move inside a VCT line, for labeling the sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VctMoveKind {
    Five,
    OpenFour,
    Four,
    OpenThree,
    Three,
}

impl VctMoveKind {
    fn from_threat(kind: ThreatKind) -> Self {
        match kind {
            ThreatKind::Five => VctMoveKind::Five,
            ThreatKind::OpenFour => VctMoveKind::OpenFour,
            ThreatKind::Four | ThreatKind::BrokenFour => VctMoveKind::Four,
            ThreatKind::OpenThree => VctMoveKind::OpenThree,
            _ => VctMoveKind::Three,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VctResult {
    pub found: bool,
    pub sequence: Vec<(usize, usize, Stone)>,
    pub depth: usize,
    /// True when the line was found by the cheaper VCF delegate.
    pub is_vcf: bool,
    /// Attacker move kinds, one per attacker ply.
    pub move_kinds: Vec<VctMoveKind>,
}

impl VctResult {
    fn not_found() -> Self {
        Self {
            found: false,
            sequence: Vec::new(),
            depth: 0,
            is_vcf: false,
            move_kinds: Vec::new(),
        }
    }

    fn from_vcf(result: VcfResult) -> Self {
        Self {
            found: true,
            depth: result.depth,
            sequence: result.sequence,
            is_vcf: true,
            move_kinds: Vec::new(),
        }
    }
}

/// Victory by Continuous Threats: VCF extended with open-three and three
/// forcing moves. Fours branch on every forced block; a three is answered by
/// the single strongest defensive reply only, which keeps the search finite.
/// The searcher is sound under that defensive policy, not complete.
pub struct VctSearch {
    max_depth: usize,
    /// Node budget; three-type branching can blow up otherwise. Exceeding
    /// it aborts the search (soundness is unaffected).
    max_nodes: u64,
    vcf: VcfSearch,
    nodes: u64,
}

impl VctSearch {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth, max_nodes: 100_000, vcf: VcfSearch::new(10), nodes: 0 }
    }

    pub fn with_node_budget(max_depth: usize, max_nodes: u64) -> Self {
        Self { max_nodes, ..Self::new(max_depth) }
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes
    }

    pub fn search(&mut self, board: &Board, attacker: Stone) -> VctResult {
        self.nodes = 0;
        let defender = attacker.opponent();
        let mut board = board.clone();

        let attacker_threats = ThreatDetector::detect(&board, attacker);
        if attacker_threats.has(ThreatKind::Five) {
            return VctResult { found: true, is_vcf: true, ..VctResult::not_found() };
        }
        if attacker_threats.has(ThreatKind::OpenFour) {
            if let Some((row, col)) = VcfSearch::open_four_completion(&board, &attacker_threats) {
                return VctResult {
                    found: true,
                    sequence: vec![(row, col, attacker)],
                    depth: 1,
                    is_vcf: true,
                    move_kinds: vec![VctMoveKind::OpenFour],
                };
            }
        }

        // VCF is cheaper; take its line when one exists.
        let vcf_result = self.vcf.search(&board, attacker);
        if vcf_result.found {
            return VctResult::from_vcf(vcf_result);
        }

        let mut sequence = Vec::new();
        let mut move_kinds = Vec::new();
        if self.dfs(&mut board, attacker, defender, 0, &mut sequence, &mut move_kinds) {
            let depth = sequence.len();
            VctResult { found: true, sequence, depth, is_vcf: false, move_kinds }
        } else {
            VctResult::not_found()
        }
    }

    fn dfs(
        &mut self,
        board: &mut Board,
        attacker: Stone,
        defender: Stone,
        depth: usize,
        sequence: &mut Vec<(usize, usize, Stone)>,
        move_kinds: &mut Vec<VctMoveKind>,
    ) -> bool {
        self.nodes += 1;
        if depth >= self.max_depth || self.nodes > self.max_nodes {
            return false;
        }

        let moves = Self::threat_creating_moves(board, attacker);

        for mv in moves {
            board.place(mv.row, mv.col, attacker);
            sequence.push((mv.row, mv.col, attacker));
            move_kinds.push(VctMoveKind::from_threat(mv.kind));

            match mv.kind {
                ThreatKind::Five => return true,
                ThreatKind::OpenFour => {
                    let threats = ThreatDetector::detect(board, attacker);
                    if let Some((row, col)) = VcfSearch::open_four_completion(board, &threats) {
                        sequence.push((row, col, attacker));
                        move_kinds.push(VctMoveKind::Five);
                    }
                    return true;
                }
                ThreatKind::Four | ThreatKind::BrokenFour => {
                    let blocks = ThreatDetector::extension_cells(board, &mv.threat);
                    if blocks.is_empty() {
                        return true;
                    }
                    let mut branch_won = false;
                    for (block_row, block_col) in blocks {
                        board.place(block_row, block_col, defender);
                        sequence.push((block_row, block_col, defender));
                        if self.dfs(board, attacker, defender, depth + 2, sequence, move_kinds) {
                            branch_won = true;
                            break;
                        }
                        board.remove(block_row, block_col);
                        sequence.pop();
                    }
                    if branch_won {
                        return true;
                    }
                }
                _ => {
                    // Three-type: the defender answers with the strongest
                    // reply only.
                    let blocks = Self::three_blocking_moves(board, &mv.threat);
                    match blocks.first() {
                        None => {
                            if self.dfs(board, attacker, defender, depth + 1, sequence, move_kinds)
                            {
                                return true;
                            }
                        }
                        Some(&(block_row, block_col)) => {
                            board.place(block_row, block_col, defender);
                            sequence.push((block_row, block_col, defender));
                            if self.dfs(board, attacker, defender, depth + 2, sequence, move_kinds)
                            {
                                return true;
                            }
                            board.remove(block_row, block_col);
                            sequence.pop();
                        }
                    }
                }
            }

            board.remove(mv.row, mv.col);
            sequence.pop();
            move_kinds.pop();
        }

        false
    }

    /// Moves creating a new forcing or pressure threat, ordered five >
    /// open-four > four > open-three > three, ties by coordinates.
    fn threat_creating_moves(board: &mut Board, attacker: Stone) -> Vec<VctMove> {
        let current = ThreatDetector::detect(board, attacker);
        let mut moves = Vec::new();

        for (row, col) in VcfSearch::candidates(board, attacker) {
            board.place(row, col, attacker);
            let after = ThreatDetector::detect(board, attacker);

            for kind in [
                ThreatKind::Five,
                ThreatKind::OpenFour,
                ThreatKind::Four,
                ThreatKind::OpenThree,
                ThreatKind::Three,
            ] {
                if let Some(threat) = VcfSearch::new_threat_of_kind(&after, &current, kind) {
                    moves.push(VctMove { row, col, kind, threat });
                    break;
                }
            }

            board.remove(row, col);
        }

        moves.sort_by_key(|m| (m.kind.table_index(), m.row, m.col));
        moves
    }

    /// Defensive replies to a three: the direct span ends first, then the
    /// cells one further out.
    fn three_blocking_moves(board: &Board, threat: &Threat) -> Vec<(usize, usize)> {
        let mut blocks = Vec::new();
        let Some(&first) = threat.positions.first() else {
            return blocks;
        };
        let &last = threat.positions.last().unwrap();
        let (dr, dc) = threat.direction.delta();

        for distance in 1..=2isize {
            let before = (first.0 as isize - dr * distance, first.1 as isize - dc * distance);
            if Board::in_bounds(before.0, before.1)
                && board.is_empty_at(before.0 as usize, before.1 as usize)
            {
                blocks.push((before.0 as usize, before.1 as usize));
            }
            let after = (last.0 as isize + dr * distance, last.1 as isize + dc * distance);
            if Board::in_bounds(after.0, after.1)
                && board.is_empty_at(after.0 as usize, after.1 as usize)
            {
                blocks.push((after.0 as usize, after.1 as usize));
            }
        }

        blocks
    }
}

struct VctMove {
    row: usize,
    col: usize,
    kind: ThreatKind,
    threat: Threat,
}
