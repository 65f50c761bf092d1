use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::core::board::{Board, Stone};
use crate::core::coords::{BOARD_SIZE, CENTER};
use crate::eval::cache::EvalCache;
use crate::eval::position::PositionEvaluator;
use crate::search::transposition::{Bound, TranspositionTable};
use crate::search::zobrist::ZobristHash;
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{DoubleThreatKind, ThreatKind};

const MAX_PLY: usize = 64;
/// Candidate cap per node after ordering.
const NODE_CANDIDATE_LIMIT: usize = 10;
const WINNING_MOVE_SCORE: i32 = 15_000;
const BLOCKING_MOVE_SCORE: i32 = 12_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredMove {
    pub row: usize,
    pub col: usize,
    pub score: i32,
}

/// Result of a `best_moves` call: top moves from the deepest completed
/// depth, plus bookkeeping for the caller.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub moves: Vec<ScoredMove>,
    pub depth_reached: u32,
    pub nodes_searched: u64,
    /// True when the time budget cut the deepening short. Best-effort
    /// results are still returned.
    pub budget_exhausted: bool,
}

/// Iterative-deepening alpha-beta with killer/history/TT move ordering.
///
/// The searcher owns its transposition table and heuristic tables; they are
/// scratch state for one analyzer and are not shared.
pub struct MinimaxSearcher {
    zobrist: ZobristHash,
    tt: TranspositionTable,
    use_tt: bool,
    killers: [[Option<(usize, usize)>; 2]; MAX_PLY],
    history: [u64; BOARD_SIZE * BOARD_SIZE],
    pub nodes_searched: u64,
}

impl MinimaxSearcher {
    pub fn new(tt_capacity: usize) -> Self {
        Self {
            zobrist: ZobristHash::new(),
            tt: TranspositionTable::new(tt_capacity),
            use_tt: true,
            killers: [[None; 2]; MAX_PLY],
            history: [0; BOARD_SIZE * BOARD_SIZE],
            nodes_searched: 0,
        }
    }

    /// Disable the transposition table (for equivalence checks).
    pub fn set_tt_enabled(&mut self, enabled: bool) {
        self.use_tt = enabled;
    }

    pub fn reset(&mut self) {
        self.tt.clear();
        self.killers = [[None; 2]; MAX_PLY];
        self.history = [0; BOARD_SIZE * BOARD_SIZE];
        self.nodes_searched = 0;
    }

    pub fn hash(&self, board: &Board, to_move: Stone) -> u64 {
        self.zobrist.compute(board, to_move)
    }

    /// Top-k moves for `player`. Forced wins and forced blocks are answered
    /// from a preflight scan without entering the search.
    pub fn best_moves(
        &mut self,
        board: &mut Board,
        player: Stone,
        max_depth: u32,
        top_k: usize,
        budget: Option<Duration>,
        cache: &EvalCache,
    ) -> SearchOutcome {
        self.nodes_searched = 0;
        self.tt.new_search();
        self.killers = [[None; 2]; MAX_PLY];
        for credit in self.history.iter_mut() {
            *credit /= 2;
        }

        let mut candidates = Self::candidate_cells(board);
        if candidates.is_empty() {
            let (row, col) = CENTER;
            let fallback = if board.is_empty_at(row, col) {
                Some(ScoredMove { row, col, score: 50 })
            } else {
                (0..BOARD_SIZE * BOARD_SIZE)
                    .map(|i| (i / BOARD_SIZE, i % BOARD_SIZE))
                    .find(|&(r, c)| board.is_empty_at(r, c))
                    .map(|(row, col)| ScoredMove { row, col, score: 0 })
            };
            return SearchOutcome {
                moves: fallback.into_iter().collect(),
                depth_reached: 0,
                nodes_searched: 0,
                budget_exhausted: false,
            };
        }

        if let Some(moves) = self.preflight(board, player, &candidates, top_k) {
            return SearchOutcome {
                moves,
                depth_reached: 0,
                nodes_searched: self.nodes_searched,
                budget_exhausted: false,
            };
        }

        let start = Instant::now();
        let out_of_time =
            |start: &Instant| matches!(budget, Some(b) if start.elapsed() >= b.mul_f64(0.8));

        let mut best: Vec<ScoredMove> = Vec::new();
        let mut depth_reached = 0;
        let mut budget_exhausted = false;
        let root_hash = self.zobrist.compute(board, player);

        let mut depth = 1u32;
        while depth <= max_depth {
            if out_of_time(&start) {
                budget_exhausted = true;
                break;
            }

            let mut scored: Vec<ScoredMove> = Vec::new();
            let mut completed = true;

            for &(row, col) in &candidates {
                if out_of_time(&start) {
                    completed = false;
                    budget_exhausted = true;
                    break;
                }

                board.place(row, col, player);
                let hash = self
                    .zobrist
                    .toggle_side(self.zobrist.update(root_hash, row, col, player));
                let score = self.alphabeta(
                    board,
                    depth.saturating_sub(1),
                    i32::MIN + 1,
                    i32::MAX - 1,
                    false,
                    player,
                    hash,
                    1,
                    cache,
                );
                board.remove(row, col);
                scored.push(ScoredMove { row, col, score });
            }

            // Only a fully scored depth may replace the previous result.
            if completed {
                scored.sort_by(|a, b| b.score.cmp(&a.score).then((a.row, a.col).cmp(&(b.row, b.col))));
                candidates = scored.iter().map(|m| (m.row, m.col)).collect();
                best = scored.into_iter().take(top_k).collect();
                depth_reached = depth;
                log::debug!(
                    "depth {depth}: {} nodes, tt hit rate {:.1}%",
                    self.nodes_searched,
                    self.tt.hit_rate() * 100.0
                );
            } else {
                break;
            }

            depth += 2;
        }

        SearchOutcome {
            moves: best,
            depth_reached,
            nodes_searched: self.nodes_searched,
            budget_exhausted,
        }
    }

    /// Immediate wins and must-block defenses, checked before any search.
    /// Returns `Some` when the position is forced.
    fn preflight(
        &mut self,
        board: &mut Board,
        player: Stone,
        candidates: &[(usize, usize)],
        top_k: usize,
    ) -> Option<Vec<ScoredMove>> {
        let opponent = player.opponent();
        let opp_before = ThreatDetector::detect(board, opponent);

        let opp_five = opp_before.count(ThreatKind::Five);
        let opp_open_four = opp_before.count(ThreatKind::OpenFour);
        let opp_four = opp_before.count(ThreatKind::Four);
        let opp_open_three = opp_before.count(ThreatKind::OpenThree);
        let opp_double_four = opp_before.double_count(DoubleThreatKind::DoubleFour);
        let opp_four_three = opp_before.double_count(DoubleThreatKind::FourThree);
        let opp_double_three = opp_before.double_count(DoubleThreatKind::DoubleThree);

        let immediate_loss =
            opp_five > 0 || opp_open_four > 0 || opp_double_four > 0 || opp_four_three > 0;

        let mut winning: Vec<ScoredMove> = Vec::new();
        let mut blocking: Vec<ScoredMove> = Vec::new();

        for &(row, col) in candidates {
            board.place(row, col, player);
            let mine = ThreatDetector::detect(board, player);
            let opp_after = ThreatDetector::detect(board, opponent);
            if mine.has(ThreatKind::Five)
                || mine.has(ThreatKind::OpenFour)
                || mine.has(ThreatKind::Four)
                || mine.double_count(DoubleThreatKind::DoubleFour) > 0
                || mine.double_count(DoubleThreatKind::FourThree) > 0
            {
                // A five-completing move keeps its full evaluator score so
                // callers comparing against it see the true gap.
                let eval = PositionEvaluator::combine(board, player, &mine, &opp_after);
                let score = eval.max(WINNING_MOVE_SCORE);
                winning.push(ScoredMove { row, col, score });
                board.remove(row, col);
                continue;
            }
            board.remove(row, col);

            let blocked_five = opp_five.saturating_sub(opp_after.count(ThreatKind::Five));
            let blocked_open_four =
                opp_open_four.saturating_sub(opp_after.count(ThreatKind::OpenFour));
            let blocked_four = opp_four.saturating_sub(opp_after.count(ThreatKind::Four));
            let blocked_open_three =
                opp_open_three.saturating_sub(opp_after.count(ThreatKind::OpenThree));
            let blocked_double_four = opp_double_four
                .saturating_sub(opp_after.double_count(DoubleThreatKind::DoubleFour));
            let blocked_four_three = opp_four_three
                .saturating_sub(opp_after.double_count(DoubleThreatKind::FourThree));
            let blocked_double_three = opp_double_three
                .saturating_sub(opp_after.double_count(DoubleThreatKind::DoubleThree));

            let blocks_anything = blocked_five > 0
                || blocked_open_four > 0
                || blocked_double_four > 0
                || blocked_four_three > 0
                || (immediate_loss && blocked_four > 0)
                || blocked_open_three > 0;

            if blocks_anything {
                let mut score = BLOCKING_MOVE_SCORE;
                score += blocked_five as i32 * 3_000;
                score += blocked_open_four as i32 * 2_000;
                score += (blocked_double_four + blocked_four_three) as i32 * 1_500;
                score += blocked_double_three as i32 * 800;
                score += blocked_open_three as i32 * 500;
                score += blocked_four as i32 * 300;
                blocking.push(ScoredMove { row, col, score });
            }
        }

        let pick = |mut moves: Vec<ScoredMove>| {
            moves.sort_by(|a, b| b.score.cmp(&a.score).then((a.row, a.col).cmp(&(b.row, b.col))));
            moves.truncate(top_k);
            moves
        };

        if !winning.is_empty() {
            return Some(pick(winning));
        }
        if !blocking.is_empty() {
            return Some(pick(blocking));
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn alphabeta(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        original: Stone,
        hash: u64,
        ply: usize,
        cache: &EvalCache,
    ) -> i32 {
        self.nodes_searched += 1;

        let mut tt_move = None;
        if self.use_tt {
            let probe = self.tt.probe(hash, depth, alpha, beta);
            if let Some(score) = probe.score {
                return score;
            }
            tt_move = probe.best_move;
        }

        if depth == 0 || Self::is_terminal(board) {
            let score = self.evaluate_cached(board, original, hash, cache);
            if self.use_tt {
                self.tt.store(hash, depth, score, Bound::Exact, None);
            }
            return score;
        }

        let current = if maximizing { original } else { original.opponent() };
        let candidates = self.ordered_candidates(board, current, ply, tt_move);
        if candidates.is_empty() {
            return 0;
        }

        let original_alpha = alpha;
        let mut best_move = None;
        let mut best_value = if maximizing { i32::MIN } else { i32::MAX };

        for (row, col) in candidates {
            board.place(row, col, current);
            let child_hash = self.zobrist.toggle_side(self.zobrist.update(hash, row, col, current));
            let value = self.alphabeta(
                board,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                original,
                child_hash,
                ply + 1,
                cache,
            );
            board.remove(row, col);

            if maximizing {
                if value > best_value {
                    best_value = value;
                    best_move = Some((row, col));
                }
                alpha = alpha.max(value);
            } else {
                if value < best_value {
                    best_value = value;
                    best_move = Some((row, col));
                }
                beta = beta.min(value);
            }

            if beta <= alpha {
                self.note_cutoff(ply, (row, col), depth);
                break;
            }
        }

        if self.use_tt {
            let bound = if best_value <= original_alpha {
                Bound::Upper
            } else if best_value >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt.store(hash, depth, best_value, bound, best_move);
        }

        best_value
    }

    fn evaluate_cached(&self, board: &Board, stone: Stone, hash: u64, cache: &EvalCache) -> i32 {
        if let Some(score) = cache.get_score(hash, stone) {
            return score;
        }
        let threats = ThreatDetector::detect(board, stone);
        let opponent_threats = ThreatDetector::detect(board, stone.opponent());
        let score = PositionEvaluator::combine(board, stone, &threats, &opponent_threats);
        cache.put_score(hash, stone, score);
        score
    }

    fn is_terminal(board: &Board) -> bool {
        ThreatDetector::detect(board, Stone::X).has(ThreatKind::Five)
            || ThreatDetector::detect(board, Stone::O).has(ThreatKind::Five)
            || board.is_full()
    }

    /// Empty cells within radius 1 of any stone, in coordinate order.
    fn candidate_cells(board: &Board) -> Vec<(usize, usize)> {
        let mut cells = BTreeSet::new();
        for (row, col, _) in board.stones() {
            for dr in -1isize..=1 {
                for dc in -1isize..=1 {
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

    /// Move ordering: TT move, then quick threat creation, killers, history
    /// credit, positional bonus. Capped after ordering.
    fn ordered_candidates(
        &mut self,
        board: &mut Board,
        player: Stone,
        ply: usize,
        tt_move: Option<(usize, usize)>,
    ) -> Vec<(usize, usize)> {
        let cells = Self::candidate_cells(board);
        if cells.is_empty() {
            return cells;
        }

        let killers = self.killers[ply.min(MAX_PLY - 1)];
        let mut scored: Vec<((usize, usize), i64)> = Vec::with_capacity(cells.len());

        for (row, col) in cells {
            let mut priority: i64 = 0;

            if tt_move == Some((row, col)) {
                priority += 100_000;
            }

            board.place(row, col, player);
            let threats = ThreatDetector::detect(board, player);
            board.remove(row, col);

            if threats.has(ThreatKind::Five) {
                priority += 50_000;
            } else if threats.has(ThreatKind::OpenFour) {
                priority += 10_000;
            } else if threats.has(ThreatKind::Four) {
                priority += 5_000;
            } else if threats.has(ThreatKind::OpenThree) {
                priority += 1_000;
            }

            if killers.contains(&Some((row, col))) {
                priority += 500;
            }

            priority += (self.history[Board::index(row, col)] / 10) as i64;
            priority += PositionEvaluator::position_bonus(row, col) as i64;

            scored.push(((row, col), priority));
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(NODE_CANDIDATE_LIMIT)
            .map(|(cell, _)| cell)
            .collect()
    }

    fn note_cutoff(&mut self, ply: usize, mv: (usize, usize), depth: u32) {
        let slot = &mut self.killers[ply.min(MAX_PLY - 1)];
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
        self.history[Board::index(mv.0, mv.1)] += (depth as u64) * (depth as u64);
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
    fn test_first_move_is_center() {
        let mut board = Board::new();
        let cache = EvalCache::default();
        let mut searcher = MinimaxSearcher::new(1 << 14);
        let outcome = searcher.best_moves(&mut board, Stone::X, 1, 1, None, &cache);
        assert_eq!(outcome.moves[0].row, 7);
        assert_eq!(outcome.moves[0].col, 7);
    }

    #[test]
    fn test_preflight_takes_the_win() {
        let mut board = board_with(&[
            (7, 7, Stone::X),
            (8, 7, Stone::X),
            (9, 7, Stone::X),
            (10, 7, Stone::X),
        ]);
        let cache = EvalCache::default();
        let mut searcher = MinimaxSearcher::new(1 << 14);
        let outcome = searcher.best_moves(&mut board, Stone::X, 3, 2, None, &cache);

        let best = outcome.moves[0];
        assert!(
            (best.row, best.col) == (6, 7) || (best.row, best.col) == (11, 7),
            "expected a five-completing move, got ({}, {})",
            best.row,
            best.col
        );
        assert_eq!(outcome.depth_reached, 0);
    }

    #[test]
    fn test_preflight_blocks_open_four() {
        let mut board = board_with(&[
            (7, 4, Stone::O),
            (7, 5, Stone::O),
            (7, 6, Stone::O),
            (7, 7, Stone::O),
            (3, 3, Stone::X),
        ]);
        let cache = EvalCache::default();
        let mut searcher = MinimaxSearcher::new(1 << 14);
        let outcome = searcher.best_moves(&mut board, Stone::X, 3, 2, None, &cache);

        let best = outcome.moves[0];
        assert!(
            (best.row, best.col) == (7, 3) || (best.row, best.col) == (7, 8),
            "expected an open-four block, got ({}, {})",
            best.row,
            best.col
        );
    }

    #[test]
    fn test_board_unchanged_after_search() {
        let mut board = board_with(&[(7, 7, Stone::X), (8, 8, Stone::O)]);
        let before = board.clone();
        let cache = EvalCache::default();
        let mut searcher = MinimaxSearcher::new(1 << 14);
        let _ = searcher.best_moves(&mut board, Stone::X, 3, 3, None, &cache);
        assert_eq!(board, before);
    }

    #[test]
    fn test_deterministic_results() {
        let mut board = board_with(&[
            (7, 7, Stone::X),
            (7, 8, Stone::O),
            (8, 7, Stone::X),
            (8, 8, Stone::O),
        ]);
        let cache = EvalCache::default();
        let mut a = MinimaxSearcher::new(1 << 14);
        let first = a.best_moves(&mut board, Stone::X, 3, 3, None, &cache);
        let mut b = MinimaxSearcher::new(1 << 14);
        let second = b.best_moves(&mut board, Stone::X, 3, 3, None, &cache);
        assert_eq!(first.moves, second.moves);
    }
}
