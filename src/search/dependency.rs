use std::collections::HashSet;

use crate::core::board::{Board, Stone};
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{Threat, ThreatKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyResult {
    pub found: bool,
    pub sequence: Vec<(usize, usize, Stone)>,
    pub depth: usize,
    pub nodes_searched: u64,
}

impl DependencyResult {
    fn not_found(nodes: u64) -> Self {
        Self { found: false, sequence: Vec::new(), depth: 0, nodes_searched: nodes }
    }
}

/// Which threat classes may be extended as forcing moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchMode {
    FoursOnly,
    ThreesAndFours,
}

/// A threat together with its dependencies: the empty cells whose occupation
/// by the opponent invalidates it (span ends plus interior gaps).
#[derive(Clone, Debug)]
struct ThreatNode {
    threat: Threat,
    deps: Vec<(usize, usize)>,
}

/// Alternate forced-win search that extends existing threats through their
/// dependency cells. Threats are ordered by (priority, ascending dependency
/// count) — fewer dependencies means a stronger threat. The dependency sets
/// are computed when a threat is discovered and inherited down the branch;
/// a branch is pruned as soon as one of its dependencies is occupied by the
/// opponent. Termination matches the VCF/VCT searchers: a five or an
/// unanswerable open four.
pub struct DependencySearch {
    max_depth: usize,
    nodes: u64,
    pruned: u64,
}

impl DependencySearch {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth, nodes: 0, pruned: 0 }
    }

    pub fn pruned_branches(&self) -> u64 {
        self.pruned
    }

    pub fn search(&mut self, board: &Board, attacker: Stone, mode: SearchMode) -> DependencyResult {
        self.nodes = 0;
        self.pruned = 0;
        let defender = attacker.opponent();
        let mut board = board.clone();

        let threats = ThreatDetector::detect(&board, attacker);
        if threats.has(ThreatKind::Five) {
            return DependencyResult {
                found: true,
                sequence: Vec::new(),
                depth: 0,
                nodes_searched: 1,
            };
        }
        if threats.has(ThreatKind::OpenFour) {
            if let Some((row, col)) =
                Self::growth_cell(&board, &threats.threats, ThreatKind::OpenFour)
            {
                return DependencyResult {
                    found: true,
                    sequence: vec![(row, col, attacker)],
                    depth: 1,
                    nodes_searched: 1,
                };
            }
        }

        let defender_threats = ThreatDetector::detect(&board, defender);
        if defender_threats.has(ThreatKind::Five) || defender_threats.has(ThreatKind::OpenFour) {
            return DependencyResult::not_found(1);
        }

        let roots = Self::build_nodes(&board, &threats.threats, mode);
        let mut sequence = Vec::new();
        let found = self.dfs(&mut board, attacker, defender, mode, 0, &mut sequence, &roots);
        let depth = sequence.len();

        DependencyResult {
            found,
            sequence: if found { sequence } else { Vec::new() },
            depth: if found { depth } else { 0 },
            nodes_searched: self.nodes,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        &mut self,
        board: &mut Board,
        attacker: Stone,
        defender: Stone,
        mode: SearchMode,
        depth: usize,
        sequence: &mut Vec<(usize, usize, Stone)>,
        threats: &[ThreatNode],
    ) -> bool {
        self.nodes += 1;
        if depth >= self.max_depth {
            return false;
        }

        for node in threats {
            if node
                .deps
                .iter()
                .any(|&(row, col)| board.get(row, col) == Some(defender))
            {
                self.pruned += 1;
                continue;
            }

            let Some((row, col)) = Self::first_empty(board, &node.deps) else {
                continue;
            };

            board.place(row, col, attacker);
            sequence.push((row, col, attacker));

            let after = ThreatDetector::detect(board, attacker);
            if after.has(ThreatKind::Five) {
                return true;
            }
            if after.has(ThreatKind::OpenFour) {
                if let Some(win) = Self::growth_cell(board, &after.threats, ThreatKind::OpenFour) {
                    sequence.push((win.0, win.1, attacker));
                    return true;
                }
            }

            let responses = Self::forced_responses(board, &after.threats, mode);
            if responses.is_empty() {
                return true;
            }

            // Dependencies captured now are what the child branch prunes on
            // once the defender's block lands.
            let children = Self::build_nodes(board, &after.threats, mode);

            let mut branch_won = false;
            for (block_row, block_col) in responses.into_iter().take(3) {
                board.place(block_row, block_col, defender);
                sequence.push((block_row, block_col, defender));

                if self.dfs(board, attacker, defender, mode, depth + 2, sequence, &children) {
                    branch_won = true;
                    break;
                }

                board.remove(block_row, block_col);
                sequence.pop();
            }

            if branch_won {
                return true;
            }

            board.remove(row, col);
            sequence.pop();
        }

        false
    }

    /// Threat nodes usable in this mode, sorted by (priority, dependency
    /// count, anchor position).
    fn build_nodes(board: &Board, threats: &[Threat], mode: SearchMode) -> Vec<ThreatNode> {
        let mut nodes: Vec<ThreatNode> = threats
            .iter()
            .filter(|t| match mode {
                SearchMode::FoursOnly => t.kind.is_four_type(),
                SearchMode::ThreesAndFours => t.kind.is_four_type() || t.kind.is_three_type(),
            })
            .map(|t| ThreatNode {
                deps: ThreatDetector::extension_cells(board, t),
                threat: t.clone(),
            })
            .collect();

        nodes.sort_by_key(|n| {
            (n.threat.kind.table_index(), n.deps.len(), n.threat.positions[0])
        });
        nodes
    }

    fn first_empty(board: &Board, cells: &[(usize, usize)]) -> Option<(usize, usize)> {
        cells
            .iter()
            .copied()
            .find(|&(row, col)| board.is_empty_at(row, col))
    }

    /// An empty growth cell of the first threat of the given kind.
    fn growth_cell(board: &Board, threats: &[Threat], kind: ThreatKind) -> Option<(usize, usize)> {
        threats
            .iter()
            .filter(|t| t.kind == kind)
            .find_map(|t| ThreatDetector::extension_cells(board, t).into_iter().next())
    }

    /// Blocking cells the defender must consider: four-type threats first;
    /// three-type blocks only when no four stands (three-aware mode only).
    fn forced_responses(
        board: &Board,
        threats: &[Threat],
        mode: SearchMode,
    ) -> Vec<(usize, usize)> {
        let mut responses = Vec::new();
        let mut seen = HashSet::new();

        for threat in threats.iter().filter(|t| t.kind.is_four_type()) {
            for cell in ThreatDetector::extension_cells(board, threat) {
                if seen.insert(cell) {
                    responses.push(cell);
                }
            }
        }

        if responses.is_empty() && mode == SearchMode::ThreesAndFours {
            for threat in threats.iter().filter(|t| t.kind.is_three_type()) {
                for cell in ThreatDetector::extension_cells(board, threat) {
                    if seen.insert(cell) {
                        responses.push(cell);
                    }
                }
            }
        }

        responses
    }
}
