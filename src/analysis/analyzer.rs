use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::analysis::comments::CommentRequest;
use crate::analysis::mistakes::{MistakeClassifier, MistakeContext};
use crate::analysis::patterns::PatternDetector;
use crate::analysis::tempo::{RoleEvaluator, TempoAnalyzer};
use crate::analysis::types::{
    AlternativeMove, AnalysisError, AnalysisResult, AnalysisTier, BestMove, GameMetadata,
    GamePattern, GamePatternKind, Initiative, Insight, Mistake, MistakeSeverity, Move,
    MoveClassification, MoveReason, PatternSeverity, PlayerStats, SequenceViolation, Summary,
    TempoStats, TempoStatus, TimelineEntry,
};
use crate::core::board::{Board, Stone};
use crate::core::coords::{format_notation, BOARD_SIZE};
use crate::eval::cache::EvalCache;
use crate::eval::position::PositionEvaluator;
use crate::opening::book::{Opening, OpeningBook};
use crate::search::dependency::{DependencySearch, SearchMode};
use crate::search::minimax::{MinimaxSearcher, ScoredMove};
use crate::search::vcf::VcfSearch;
use crate::search::vct::VctSearch;
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{DoubleThreatKind, ThreatKind, ThreatResult};

/// Opening-phase tolerance window, in plies.
const OPENING_PLIES: usize = 8;
/// Minimum adjusted-score loss before a move is recorded as a mistake.
const MISTAKE_LOSS_FLOOR: i32 = 300;

/// Which forced-win searcher backs the missed-win checks. Both satisfy the
/// same contract; the dependency-based one prunes differently.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ForcedWinStrategy {
    #[default]
    Sequential,
    Dependency,
}

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub tier: AnalysisTier,
    /// Base minimax depth; bumped in sharp endgame positions.
    pub search_depth: u32,
    pub vcf_depth: usize,
    pub vct_depth: usize,
    pub forced_win_strategy: ForcedWinStrategy,
    pub top_candidates: usize,
    pub time_budget: Option<Duration>,
    pub tt_capacity: usize,
}

impl AnalyzerConfig {
    pub fn fast() -> Self {
        Self {
            tier: AnalysisTier::Fast,
            search_depth: 1,
            vcf_depth: 3,
            vct_depth: 8,
            forced_win_strategy: ForcedWinStrategy::default(),
            top_candidates: 5,
            time_budget: Some(Duration::from_millis(2_000)),
            tt_capacity: 1 << 16,
        }
    }

    pub fn deep() -> Self {
        Self {
            tier: AnalysisTier::Deep,
            search_depth: 3,
            vcf_depth: 20,
            vct_depth: 16,
            forced_win_strategy: ForcedWinStrategy::default(),
            top_candidates: 5,
            time_budget: Some(Duration::from_millis(30_000)),
            tt_capacity: 1 << 20,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::fast()
    }
}

/// What a missed forced win looked like, when one was detected.
struct MissedWin {
    best_move: (usize, usize),
}

/// Strategy-independent view of a forced-win search result.
struct ForcedLine {
    found: bool,
    first: Option<(usize, usize)>,
    depth: usize,
}

/// A proven forced-win line, both players' moves included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinningLine {
    pub moves: Vec<(usize, usize, Stone)>,
    pub is_vcf: bool,
}

/// Post-game analysis orchestrator. Owns all scratch state (replay board,
/// transposition table, heuristic tables, memo cache); everything is reset
/// per call and nothing escapes except the `AnalysisResult`. One analyzer
/// serves one worker; hosts analyzing games concurrently instantiate one
/// per thread (see `analyze_games`).
pub struct GameAnalyzer {
    config: AnalyzerConfig,
    board: Board,
    minimax: MinimaxSearcher,
    vcf: VcfSearch,
    vct: VctSearch,
    cache: EvalCache,
    opening_book: OpeningBook,
}

impl Default for GameAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl GameAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            board: Board::new(),
            minimax: MinimaxSearcher::new(config.tt_capacity),
            vcf: VcfSearch::new(config.vcf_depth),
            vct: VctSearch::new(config.vct_depth),
            cache: EvalCache::default(),
            opening_book: OpeningBook::new(),
            config,
        }
    }

    pub fn opening_book(&self) -> &OpeningBook {
        &self.opening_book
    }

    /// Identify the opening from the first moves of a game.
    pub fn identify_opening(&self, moves: &[Move]) -> Option<&Opening> {
        self.opening_book.identify(&moves[..moves.len().min(5)])
    }

    /// Full threat recognition for one position.
    pub fn classify_position(
        &self,
        board: &Board,
        stone: Stone,
    ) -> Result<ThreatResult, AnalysisError> {
        board.validate()?;
        Ok(ThreatDetector::detect(board, stone))
    }

    /// Best single move for the side to move, VCF-first.
    pub fn find_best_move(
        &mut self,
        board: &Board,
        stone: Stone,
    ) -> Result<Option<BestMove>, AnalysisError> {
        board.validate()?;
        let mut scratch = board.clone();

        let vcf_result = self.vcf.search(&scratch, stone);
        if vcf_result.found {
            if let Some(&(row, col, _)) = vcf_result.sequence.first() {
                let score = PositionEvaluator::evaluate_move(&mut scratch, row, col, stone);
                return Ok(Some(BestMove {
                    row,
                    col,
                    notation: format_notation(row, col)?,
                    score,
                    reason: MoveReason::Wins,
                }));
            }
        }

        let outcome = self.minimax.best_moves(
            &mut scratch,
            stone,
            self.config.search_depth,
            1,
            self.config.time_budget,
            &self.cache,
        );
        let Some(best) = outcome.moves.first().copied() else {
            return Ok(None);
        };
        let reason = Self::move_reason(&mut scratch, best.row, best.col, stone);
        Ok(Some(BestMove {
            row: best.row,
            col: best.col,
            notation: format_notation(best.row, best.col)?,
            score: best.score,
            reason,
        }))
    }

    /// Analyze many games concurrently; one analyzer per worker, nothing
    /// shared but the read-only configuration.
    pub fn analyze_games(
        config: &AnalyzerConfig,
        games: &[Vec<Move>],
        metadata: Option<&GameMetadata>,
    ) -> Vec<Result<AnalysisResult, AnalysisError>> {
        games
            .par_iter()
            .map(|moves| GameAnalyzer::new(config.clone()).analyze_game(moves, metadata))
            .collect()
    }

    /// Replay a game and assemble the full move-by-move analysis.
    pub fn analyze_game(
        &mut self,
        moves: &[Move],
        metadata: Option<&GameMetadata>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        let default_metadata = GameMetadata::default();
        let metadata = metadata.unwrap_or(&default_metadata);

        Self::validate_moves(moves)?;
        self.board.clear();
        self.minimax.reset();
        self.cache.clear();

        let opening = self.opening_book.identify(&moves[..moves.len().min(5)]).cloned();

        let mut timeline: Vec<TimelineEntry> = Vec::with_capacity(moves.len());
        let mut mistakes: Vec<Mistake> = Vec::new();
        let mut best_first_per_ply: Vec<Option<ScoredMove>> = Vec::with_capacity(moves.len());
        let mut previous_initiative = Initiative::Neutral;
        let mut winner: Option<Stone> = None;

        for (i, mv) in moves.iter().enumerate() {
            let move_number = i + 1;
            let player = mv.stone;
            let opponent = player.opponent();

            let own_before = ThreatDetector::detect(&self.board, player);
            let opp_before = ThreatDetector::detect(&self.board, opponent);

            // Sharp positions from the middle game onward get a deeper
            // look.
            let is_endgame = i >= 10
                && (own_before.has_forcing()
                    || opp_before.has_forcing()
                    || own_before.count(ThreatKind::OpenThree)
                        + opp_before.count(ThreatKind::OpenThree)
                        >= 2);
            let depth = if is_endgame {
                self.config.search_depth + 2
            } else {
                self.config.search_depth
            };

            let outcome = self.minimax.best_moves(
                &mut self.board,
                player,
                depth,
                self.config.top_candidates,
                self.config.time_budget,
                &self.cache,
            );
            let best = outcome.moves.first().copied();
            best_first_per_ply.push(best);

            let missed_win = self.check_missed_win(mv, player, &opp_before);

            // Blend positional evaluation with role-weighted scoring, then
            // apply the game-type strictness.
            let eval_score =
                PositionEvaluator::evaluate_move(&mut self.board, mv.row, mv.col, player);
            let role_before = RoleEvaluator::determine_from(&own_before, &opp_before);
            let role_score =
                RoleEvaluator::score_move(&mut self.board, mv.row, mv.col, player, role_before.role)
                    .total;
            let actual_score = metadata.adjust_score((eval_score * 7 + role_score * 3) / 10);
            let best_score = metadata.adjust_score(best.map_or(0, |b| b.score));

            let mut classification = Self::classify(actual_score, best_score);

            // Alternatives come from the same pre-move candidate list.
            let mut alternatives =
                self.build_alternatives(&outcome.moves, (mv.row, mv.col), player);

            // Winning-move floor: creating a five or open four is never
            // worse than good.
            self.board.place(mv.row, mv.col, player);
            let eval_after = PositionEvaluator::evaluate(&self.board, player);
            let own_after = &eval_after.threats;
            let opp_after = &eval_after.opponent_threats;

            let creates_five = own_after.count(ThreatKind::Five) > own_before.count(ThreatKind::Five);
            let creates_open_four =
                own_after.count(ThreatKind::OpenFour) > own_before.count(ThreatKind::OpenFour);
            if creates_five || creates_open_four {
                classification = classification.min(MoveClassification::Good);
            }

            // Opening tolerance: quiet early moves are judged loosely.
            if move_number <= OPENING_PLIES {
                let immediate_threat = opp_before.has(ThreatKind::Five)
                    || opp_before.has(ThreatKind::OpenFour)
                    || opp_before.has(ThreatKind::Four)
                    || opp_before.has(ThreatKind::OpenThree);
                let own_pressure = own_before.has(ThreatKind::Four)
                    || own_before.has(ThreatKind::OpenFour)
                    || own_before.has(ThreatKind::OpenThree);

                if classification == MoveClassification::Blunder && !immediate_threat {
                    classification = if own_pressure {
                        MoveClassification::Weak
                    } else {
                        MoveClassification::Okay
                    };
                } else if classification == MoveClassification::Excellent
                    && !immediate_threat
                    && !own_pressure
                {
                    classification = MoveClassification::Good;
                }
            }

            let is_winning_move = creates_five
                || (creates_open_four
                    && !opp_before.has(ThreatKind::OpenFour)
                    && !opp_before.has(ThreatKind::Four));
            let is_good_defense =
                !is_winning_move && Self::blocked_standing_threat(&opp_before, opp_after);

            if own_after.has(ThreatKind::Five) && winner.is_none() {
                winner = Some(player);
            }

            if !is_winning_move && !is_good_defense {
                if let Some(mistake) = self.judge_mistake(
                    mv,
                    move_number,
                    best,
                    actual_score,
                    best_score,
                    missed_win.as_ref(),
                    &own_before,
                    &opp_before,
                    own_after,
                    opp_after,
                ) {
                    mistakes.push(mistake);
                }
            }

            // Flag the strongest alternative when the move was a blunder.
            if classification == MoveClassification::Blunder {
                if let Some(first) = alternatives.first_mut() {
                    first.is_best = true;
                }
            }

            let tempo = TempoAnalyzer::analyze(
                &own_before,
                own_after,
                &opp_before,
                opp_after,
                player,
                previous_initiative,
            );
            previous_initiative = tempo.initiative;

            let role = RoleEvaluator::determine_from(own_after, opp_after).role;

            let better_move = if classification == MoveClassification::Blunder {
                best.and_then(|b| format_notation(b.row, b.col).ok())
            } else {
                None
            };
            let comment = CommentRequest::for_move(
                classification,
                own_after,
                &opp_before,
                opp_after,
                better_move,
                metadata,
                player,
            );

            timeline.push(TimelineEntry {
                move_number,
                stone: player,
                row: mv.row,
                col: mv.col,
                notation: mv.notation(),
                score: eval_after.score,
                win_probability: eval_after.win_probability,
                classification,
                opponent_context: opp_after.kinds_present(),
                role,
                tempo,
                alternatives,
                comment,
            });
        }

        let mut patterns = PatternDetector::detect(moves, &best_first_per_ply);
        if let Some(opening) = &opening {
            patterns.insert(
                0,
                GamePattern {
                    kind: GamePatternKind::Opening { name: opening.name.to_string() },
                    moves: vec![1, 2, 3],
                    severity: PatternSeverity::Info,
                },
            );
        }

        let summary = Self::summarize(&timeline, &mistakes, winner);

        let best_move = if winner.is_none() && !moves.is_empty() && !self.board.is_full() {
            let next = moves[moves.len() - 1].stone.opponent();
            let board = self.board.clone();
            self.find_best_move(&board, next)?
        } else {
            None
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        log::debug!(
            "analyzed {} moves in {duration_ms} ms ({} mistakes, cache hit rate {:.1}%)",
            moves.len(),
            mistakes.len(),
            self.cache.stats().hit_rate() * 100.0
        );

        Ok(AnalysisResult {
            tier: self.config.tier,
            timeline,
            mistakes,
            patterns,
            best_move,
            summary,
            duration_ms,
        })
    }

    /// Reject sequences that replay onto occupied cells, leave the board,
    /// or break alternation. The ordinal of the offending move is 1-based.
    fn validate_moves(moves: &[Move]) -> Result<(), AnalysisError> {
        let mut board = Board::new();
        let mut last_stone: Option<Stone> = None;

        for (i, mv) in moves.iter().enumerate() {
            let ordinal = i + 1;
            if mv.row >= BOARD_SIZE || mv.col >= BOARD_SIZE {
                return Err(AnalysisError::InvalidMoveSequence {
                    ordinal,
                    violation: SequenceViolation::OutOfBounds,
                });
            }
            if !board.is_empty_at(mv.row, mv.col) {
                return Err(AnalysisError::InvalidMoveSequence {
                    ordinal,
                    violation: SequenceViolation::OccupiedCell,
                });
            }
            if last_stone == Some(mv.stone) {
                return Err(AnalysisError::InvalidMoveSequence {
                    ordinal,
                    violation: SequenceViolation::WrongTurnOrder,
                });
            }
            board.place(mv.row, mv.col, mv.stone);
            last_stone = Some(mv.stone);
        }
        Ok(())
    }

    /// Relative-score classification ladder. A missed winning move (best
    /// ≥ 10000 while the actual stays below) weighs extra.
    fn classify(actual: i32, best: i32) -> MoveClassification {
        let diff = best.saturating_sub(actual);

        if best >= 10_000 && actual < 10_000 {
            if diff > 5_000 {
                return MoveClassification::Blunder;
            }
            if diff > 1_000 {
                return MoveClassification::Weak;
            }
        }

        if diff > 5_000 {
            MoveClassification::Blunder
        } else if diff > 1_000 {
            MoveClassification::Weak
        } else if diff > 200 {
            MoveClassification::Okay
        } else if diff > 50 {
            MoveClassification::Good
        } else {
            MoveClassification::Excellent
        }
    }

    /// Did this move reduce a standing opponent threat worth blocking?
    fn blocked_standing_threat(before: &ThreatResult, after: &ThreatResult) -> bool {
        let reduced = |kind: ThreatKind| after.count(kind) < before.count(kind);
        let reduced_double =
            |kind: DoubleThreatKind| after.double_count(kind) < before.double_count(kind);

        (before.has(ThreatKind::OpenFour) && reduced(ThreatKind::OpenFour))
            || (before.has(ThreatKind::Four) && reduced(ThreatKind::Four))
            || (before.has(ThreatKind::OpenThree) && reduced(ThreatKind::OpenThree))
            || (before.double_count(DoubleThreatKind::DoubleFour) > 0
                && reduced_double(DoubleThreatKind::DoubleFour))
            || (before.double_count(DoubleThreatKind::FourThree) > 0
                && reduced_double(DoubleThreatKind::FourThree))
            || (before.double_count(DoubleThreatKind::DoubleThree) > 0
                && reduced_double(DoubleThreatKind::DoubleThree))
    }

    /// Forced-win lookup behind the configured strategy. Both searchers
    /// share the soundness contract and the output shape.
    fn forced_win(&mut self, board: &Board, stone: Stone) -> ForcedLine {
        match self.config.forced_win_strategy {
            ForcedWinStrategy::Sequential => {
                let result = self.vcf.search(board, stone);
                ForcedLine {
                    found: result.found,
                    first: result.sequence.first().map(|&(row, col, _)| (row, col)),
                    depth: result.depth,
                }
            }
            ForcedWinStrategy::Dependency => {
                let mut search = DependencySearch::new(self.config.vcf_depth);
                let result = search.search(board, stone, SearchMode::FoursOnly);
                ForcedLine {
                    found: result.found,
                    first: result.sequence.first().map(|&(row, col, _)| (row, col)),
                    depth: result.depth,
                }
            }
        }
    }

    /// Full forced-win lookup for a position: VCF first, then the wider
    /// (and costlier) VCT. Exposed for hosts that want the winning line
    /// itself rather than per-move verdicts.
    pub fn find_winning_sequence(
        &mut self,
        board: &Board,
        stone: Stone,
    ) -> Result<Option<WinningLine>, AnalysisError> {
        board.validate()?;

        let vcf_result = self.vcf.search(board, stone);
        if vcf_result.found {
            return Ok(Some(WinningLine { moves: vcf_result.sequence, is_vcf: true }));
        }

        let vct_result = self.vct.search(board, stone);
        if vct_result.found {
            return Ok(Some(WinningLine { moves: vct_result.sequence, is_vcf: vct_result.is_vcf }));
        }
        Ok(None)
    }

    /// Missed-forced-win detection on the pre-move board. Returns `None`
    /// when the move itself wins, blocks, or defends correctly.
    fn check_missed_win(
        &mut self,
        mv: &Move,
        player: Stone,
        opp_before: &ThreatResult,
    ) -> Option<MissedWin> {
        let opponent = player.opponent();

        let mut board_after = self.board.clone();
        board_after.place(mv.row, mv.col, player);
        let own_after = ThreatDetector::detect(&board_after, player);
        if own_after.has(ThreatKind::Five) || own_after.has(ThreatKind::OpenFour) {
            return None;
        }

        let opp_had_open_four = opp_before.has(ThreatKind::OpenFour);
        let opp_line = if opp_had_open_four {
            None
        } else {
            let pre_board = self.board.clone();
            let line = self.forced_win(&pre_board, opponent);
            line.found.then_some(line)
        };

        if opp_had_open_four || opp_line.is_some() {
            let opp_after = ThreatDetector::detect(&board_after, opponent);

            if opp_had_open_four {
                if opp_after.count(ThreatKind::OpenFour) < opp_before.count(ThreatKind::OpenFour) {
                    return None;
                }
                // The open four is still standing: the only acceptable move
                // was the block.
                let block = opp_before
                    .threats
                    .iter()
                    .find(|t| t.kind == ThreatKind::OpenFour)
                    .and_then(|t| {
                        ThreatDetector::extension_cells(&self.board, t).into_iter().next()
                    });
                if let Some(best_move) = block {
                    return Some(MissedWin { best_move });
                }
            }

            if let Some(opp_line) = &opp_line {
                let still = self.forced_win(&board_after, opponent);
                if !still.found {
                    return None;
                }
                if opp_line.first == Some((mv.row, mv.col)) {
                    return None;
                }
            }
        }

        // Blocking a standing open three is a legitimate answer even with
        // an own forced win on the board.
        if opp_before.has(ThreatKind::OpenThree) {
            let opp_after = ThreatDetector::detect(&board_after, opponent);
            if opp_after.count(ThreatKind::OpenThree) < opp_before.count(ThreatKind::OpenThree) {
                return None;
            }
        }

        let pre_board = self.board.clone();
        let own_line = self.forced_win(&pre_board, player);
        if own_line.found {
            if let Some((row, col)) = own_line.first {
                if (row, col) != (mv.row, mv.col) {
                    if let Some(opp_line) = &opp_line {
                        if opp_line.depth <= own_line.depth {
                            let still = self.forced_win(&board_after, opponent);
                            if !still.found {
                                return None;
                            }
                            if let Some(best_move) = opp_line.first {
                                return Some(MissedWin { best_move });
                            }
                        }
                    }
                    return Some(MissedWin { best_move: (row, col) });
                }
            }
        }

        None
    }

    #[allow(clippy::too_many_arguments)]
    fn judge_mistake(
        &self,
        mv: &Move,
        move_number: usize,
        best: Option<ScoredMove>,
        actual_score: i32,
        best_score: i32,
        missed_win: Option<&MissedWin>,
        own_before: &ThreatResult,
        opp_before: &ThreatResult,
        own_after: &ThreatResult,
        opp_after: &ThreatResult,
    ) -> Option<Mistake> {
        let best = best?;
        if (best.row, best.col) == (mv.row, mv.col) {
            return None;
        }

        let loss = best_score.saturating_sub(actual_score);
        if loss < MISTAKE_LOSS_FLOOR && missed_win.is_none() {
            return None;
        }

        let mut severity = MistakeClassifier::severity(actual_score, best_score);
        let better_move = match missed_win {
            Some(missed) => {
                severity = MistakeSeverity::Critical;
                missed.best_move
            }
            None => (best.row, best.col),
        };

        // Category needs the best-move threat picture on the pre-move
        // board; the analyzer board already carries the actual move, so
        // reconstruct the pre-move position.
        let mut board_before = self.board.clone();
        board_before.remove(mv.row, mv.col);

        let mut with_best = board_before.clone();
        with_best.place(better_move.0, better_move.1, mv.stone);
        let own_after_best = ThreatDetector::detect(&with_best, mv.stone);
        let opp_after_best = ThreatDetector::detect(&with_best, mv.stone.opponent());

        let ctx = MistakeContext {
            board_before: &board_before,
            actual: *mv,
            best: better_move,
            mover_before: own_before,
            opponent_before: opp_before,
            mover_after_actual: own_after,
            opponent_after_actual: opp_after,
            mover_after_best: &own_after_best,
            opponent_after_best: &opp_after_best,
        };
        let category = MistakeClassifier::categorize(&ctx);

        let notation = format_notation(better_move.0, better_move.1).unwrap_or_default();
        Some(Mistake {
            move_number,
            stone: mv.stone,
            severity,
            category,
            description: MistakeClassifier::describe(category, &notation),
            better_move,
            score_loss: loss,
        })
    }

    /// Up to three alternatives from the candidate list, skipping the move
    /// actually played.
    fn build_alternatives(
        &mut self,
        candidates: &[ScoredMove],
        actual: (usize, usize),
        player: Stone,
    ) -> Vec<AlternativeMove> {
        let mut alternatives = Vec::new();
        for candidate in candidates {
            if (candidate.row, candidate.col) == actual {
                continue;
            }
            let reason =
                Self::move_reason(&mut self.board, candidate.row, candidate.col, player);
            alternatives.push(AlternativeMove {
                row: candidate.row,
                col: candidate.col,
                notation: format_notation(candidate.row, candidate.col).unwrap_or_default(),
                score: candidate.score,
                reason,
                is_best: false,
            });
            if alternatives.len() == 3 {
                break;
            }
        }
        alternatives
    }

    /// Why-tag for one candidate move: wins, forces, blocks, develops, or
    /// merely positional.
    fn move_reason(board: &mut Board, row: usize, col: usize, stone: Stone) -> MoveReason {
        let opponent = stone.opponent();
        let opp_before = ThreatDetector::detect(board, opponent);

        board.place(row, col, stone);
        let mine = ThreatDetector::detect(board, stone);
        let opp_after = ThreatDetector::detect(board, opponent);
        board.remove(row, col);

        if mine.has(ThreatKind::Five) || mine.has(ThreatKind::OpenFour) {
            return MoveReason::Wins;
        }
        if mine.double_count(DoubleThreatKind::DoubleFour) > 0
            || mine.double_count(DoubleThreatKind::FourThree) > 0
            || mine.has(ThreatKind::Four)
            || mine.has(ThreatKind::OpenThree)
            || mine.double_count(DoubleThreatKind::DoubleThree) > 0
        {
            return MoveReason::Forces;
        }
        if Self::blocked_standing_threat(&opp_before, &opp_after) {
            return MoveReason::Blocks;
        }
        if mine.has(ThreatKind::Three)
            || mine.has(ThreatKind::BrokenThree)
            || mine.has(ThreatKind::JumpThree)
            || mine.has(ThreatKind::OpenTwo)
        {
            return MoveReason::Develops;
        }
        MoveReason::Positional
    }

    fn summarize(
        timeline: &[TimelineEntry],
        mistakes: &[Mistake],
        winner: Option<Stone>,
    ) -> Summary {
        let x_stats = Self::player_stats(timeline, mistakes, Stone::X);
        let o_stats = Self::player_stats(timeline, mistakes, Stone::O);

        let mut tempo = TempoStats::default();
        for entry in timeline {
            if entry.tempo.is_forcing {
                match entry.stone {
                    Stone::X => tempo.x_forcing_moves += 1,
                    Stone::O => tempo.o_forcing_moves += 1,
                }
            } else if entry.tempo.status == TempoStatus::Slow {
                match entry.stone {
                    Stone::X => tempo.x_slow_moves += 1,
                    Stone::O => tempo.o_slow_moves += 1,
                }
            }
            if entry.tempo.is_switch {
                tempo.switches += 1;
            }
        }

        let mut insights = Vec::new();
        insights.push(match winner {
            Some(stone) => Insight::Winner { stone },
            None => Insight::Unfinished,
        });

        let critical = mistakes
            .iter()
            .filter(|m| m.severity == MistakeSeverity::Critical)
            .count();
        if critical > 0 {
            insights.push(Insight::CriticalMistakes { count: critical });
        }

        if x_stats.excellent != o_stats.excellent
            && x_stats.total_moves > 0
            && o_stats.total_moves > 0
        {
            let stone = if x_stats.excellent > o_stats.excellent { Stone::X } else { Stone::O };
            insights.push(Insight::MoreAccuratePlayer { stone });
        }

        if let Some(entry) = timeline
            .iter()
            .find(|e| e.classification == MoveClassification::Blunder)
        {
            insights.push(Insight::TurningPoint { move_number: entry.move_number });
        }
        insights.truncate(3);

        Summary {
            total_moves: timeline.len(),
            winner,
            x_stats,
            o_stats,
            tempo,
            insights,
        }
    }

    fn player_stats(timeline: &[TimelineEntry], mistakes: &[Mistake], stone: Stone) -> PlayerStats {
        let entries: Vec<&TimelineEntry> =
            timeline.iter().filter(|e| e.stone == stone).collect();
        let own_mistakes: Vec<&Mistake> = mistakes.iter().filter(|m| m.stone == stone).collect();

        if entries.is_empty() {
            return PlayerStats::default();
        }

        let count_class = |class: MoveClassification| {
            entries.iter().filter(|e| e.classification == class).count()
        };
        let excellent = count_class(MoveClassification::Excellent);
        let good = count_class(MoveClassification::Good);
        let total = entries.len();
        let score_sum: i64 = entries.iter().map(|e| e.score as i64).sum();

        PlayerStats {
            total_moves: total,
            excellent,
            good,
            okay: count_class(MoveClassification::Okay),
            weak: count_class(MoveClassification::Weak),
            blunders: count_class(MoveClassification::Blunder),
            mistakes: own_mistakes.len(),
            critical_mistakes: own_mistakes
                .iter()
                .filter(|m| m.severity == MistakeSeverity::Critical)
                .count(),
            average_score: (score_sum / total as i64) as i32,
            accuracy: (excellent + good) as f64 / total as f64 * 100.0,
        }
    }
}
