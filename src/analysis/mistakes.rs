use crate::analysis::types::{MistakeCategory, MistakeSeverity, Move};
use crate::core::board::Board;
use crate::eval::position::PositionEvaluator;
use crate::threats::types::{ThreatKind, ThreatResult};

/// Positional-mistake thresholds.
const POSITION_BONUS_GAP: i32 = 5;
const CENTER_DISTANCE_GAP: usize = 4;
const NEIGHBOR_GAP: usize = 2;
/// Tempo-mistake threat-score gap.
const TEMPO_SCORE_GAP: i32 = 300;

/// The threat picture around one move, used to pick a mistake category.
pub struct MistakeContext<'a> {
    pub board_before: &'a Board,
    pub actual: Move,
    pub best: (usize, usize),
    pub mover_before: &'a ThreatResult,
    pub opponent_before: &'a ThreatResult,
    pub mover_after_actual: &'a ThreatResult,
    pub opponent_after_actual: &'a ThreatResult,
    pub mover_after_best: &'a ThreatResult,
    pub opponent_after_best: &'a ThreatResult,
}

/// Four-dimensional mistake labeling: tactical, positional, tempo, and
/// strategic as the residual. Severity comes from the relative score loss.
pub struct MistakeClassifier;

impl MistakeClassifier {
    /// Critical when ≥70% of the best score or ≥5000 points were lost;
    /// major at ≥30% or ≥500; minor otherwise. With a non-positive best
    /// score, absolute fallbacks of 1000/300 apply.
    pub fn severity(actual_score: i32, best_score: i32) -> MistakeSeverity {
        let loss = best_score.saturating_sub(actual_score);

        if best_score <= 0 {
            return if loss >= 1_000 {
                MistakeSeverity::Critical
            } else if loss >= 300 {
                MistakeSeverity::Major
            } else {
                MistakeSeverity::Minor
            };
        }

        let percent_loss = (loss as i64 * 100) / best_score as i64;
        if loss >= 5_000 || percent_loss >= 70 {
            MistakeSeverity::Critical
        } else if loss >= 500 || percent_loss >= 30 {
            MistakeSeverity::Major
        } else {
            MistakeSeverity::Minor
        }
    }

    /// Prioritized category decision: tactical, then positional, then
    /// tempo, with strategic as the default residual.
    pub fn categorize(ctx: &MistakeContext<'_>) -> MistakeCategory {
        if Self::is_tactical(ctx) {
            MistakeCategory::Tactical
        } else if Self::is_positional(ctx) {
            MistakeCategory::Positional
        } else if Self::is_tempo(ctx) {
            MistakeCategory::Tempo
        } else {
            MistakeCategory::Strategic
        }
    }

    /// Tactical: the best move would have created a four-type threat the
    /// actual move did not, or the opponent had a four-type / open-three
    /// threat standing and the actual move failed to reduce it.
    fn is_tactical(ctx: &MistakeContext<'_>) -> bool {
        let best_creates_open_four = ctx.mover_after_best.count(ThreatKind::OpenFour)
            > ctx.mover_after_actual.count(ThreatKind::OpenFour);
        let best_creates_four = ctx.mover_after_best.count(ThreatKind::Four)
            > ctx.mover_after_actual.count(ThreatKind::Four);

        let opponent_had_four = ctx.opponent_before.has(ThreatKind::Four)
            || ctx.opponent_before.has(ThreatKind::OpenFour);
        let best_blocks_four = ctx.opponent_after_best.count(ThreatKind::Four)
            < ctx.opponent_after_actual.count(ThreatKind::Four)
            || ctx.opponent_after_best.count(ThreatKind::OpenFour)
                < ctx.opponent_after_actual.count(ThreatKind::OpenFour);

        let opponent_had_open_three = ctx.opponent_before.has(ThreatKind::OpenThree);
        let best_blocks_open_three = ctx.opponent_after_best.count(ThreatKind::OpenThree)
            < ctx.opponent_after_actual.count(ThreatKind::OpenThree);

        best_creates_open_four
            || best_creates_four
            || (opponent_had_four && best_blocks_four)
            || (opponent_had_open_three && best_blocks_open_three)
    }

    /// Positional: the played cell is measurably worse ground than the best
    /// one — positional bonus, centrality, or connection to own stones.
    fn is_positional(ctx: &MistakeContext<'_>) -> bool {
        let actual_bonus = PositionEvaluator::position_bonus(ctx.actual.row, ctx.actual.col);
        let best_bonus = PositionEvaluator::position_bonus(ctx.best.0, ctx.best.1);
        if best_bonus - actual_bonus >= POSITION_BONUS_GAP {
            return true;
        }

        let actual_dist = crate::analysis::tempo::RoleEvaluator::center_distance(
            ctx.actual.row,
            ctx.actual.col,
        );
        let best_dist =
            crate::analysis::tempo::RoleEvaluator::center_distance(ctx.best.0, ctx.best.1);
        if actual_dist.saturating_sub(best_dist) >= CENTER_DISTANCE_GAP {
            return true;
        }

        let actual_neighbors = ctx.board_before.neighbor_count(ctx.actual.row, ctx.actual.col);
        let best_neighbors = ctx.board_before.neighbor_count(ctx.best.0, ctx.best.1);
        best_neighbors.saturating_sub(actual_neighbors) >= NEIGHBOR_GAP
    }

    /// Tempo: the best move would have kept up the pressure (open three or
    /// better) while the actual move was passive.
    fn is_tempo(ctx: &MistakeContext<'_>) -> bool {
        let best_creates_pressure = ctx.mover_after_best.count(ThreatKind::OpenThree)
            > ctx.mover_after_actual.count(ThreatKind::OpenThree);
        let actual_is_passive = ctx.mover_after_actual.score <= ctx.mover_before.score;
        let score_gap = ctx.mover_after_best.score - ctx.mover_after_actual.score;

        (best_creates_pressure && actual_is_passive)
            || (score_gap >= TEMPO_SCORE_GAP && actual_is_passive)
    }

    /// Terse technical description for the mistake record.
    pub fn describe(category: MistakeCategory, better: &str) -> String {
        match category {
            MistakeCategory::Tactical => format!("missed tactic; {better} was stronger"),
            MistakeCategory::Positional => format!("poor square; {better} was better ground"),
            MistakeCategory::Strategic => format!("wrong direction; {better} built more"),
            MistakeCategory::Tempo => format!("passive move; {better} kept the initiative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Stone;
    use crate::threats::detector::ThreatDetector;

    #[test]
    fn test_severity_ladder() {
        assert_eq!(MistakeClassifier::severity(100, 10_000), MistakeSeverity::Critical);
        assert_eq!(MistakeClassifier::severity(9_800, 10_000), MistakeSeverity::Minor);
        assert_eq!(MistakeClassifier::severity(400, 1_000), MistakeSeverity::Major);
        assert_eq!(MistakeClassifier::severity(950, 1_000), MistakeSeverity::Minor);
        // Absolute ladder when the best score is not positive.
        assert_eq!(MistakeClassifier::severity(-1_500, -100), MistakeSeverity::Critical);
        assert_eq!(MistakeClassifier::severity(-500, -100), MistakeSeverity::Major);
        assert_eq!(MistakeClassifier::severity(-150, -100), MistakeSeverity::Minor);
    }

    #[test]
    fn test_tactical_when_best_blocks_four() {
        let mut board = Board::new();
        for col in 3..7 {
            board.place(7, col, Stone::O);
        }
        board.place(7, 2, Stone::X);
        board.place(0, 0, Stone::X);

        let mover_before = ThreatDetector::detect(&board, Stone::X);
        let opponent_before = ThreatDetector::detect(&board, Stone::O);

        // Actual: a corner move that ignores the four. Best: the block.
        let mut with_actual = board.clone();
        with_actual.place(0, 1, Stone::X);
        let mover_after_actual = ThreatDetector::detect(&with_actual, Stone::X);
        let opponent_after_actual = ThreatDetector::detect(&with_actual, Stone::O);

        let mut with_best = board.clone();
        with_best.place(7, 7, Stone::X);
        let mover_after_best = ThreatDetector::detect(&with_best, Stone::X);
        let opponent_after_best = ThreatDetector::detect(&with_best, Stone::O);

        let ctx = MistakeContext {
            board_before: &board,
            actual: Move::new(0, 1, Stone::X),
            best: (7, 7),
            mover_before: &mover_before,
            opponent_before: &opponent_before,
            mover_after_actual: &mover_after_actual,
            opponent_after_actual: &opponent_after_actual,
            mover_after_best: &mover_after_best,
            opponent_after_best: &opponent_after_best,
        };
        assert_eq!(MistakeClassifier::categorize(&ctx), MistakeCategory::Tactical);
    }

    #[test]
    fn test_positional_for_isolated_corner() {
        let mut board = Board::new();
        board.place(7, 7, Stone::X);
        board.place(7, 8, Stone::O);
        board.place(8, 8, Stone::X);
        board.place(8, 7, Stone::O);

        let empty_x = ThreatDetector::detect(&board, Stone::X);
        let empty_o = ThreatDetector::detect(&board, Stone::O);

        let ctx = MistakeContext {
            board_before: &board,
            actual: Move::new(14, 14, Stone::X),
            best: (6, 6),
            mover_before: &empty_x,
            opponent_before: &empty_o,
            mover_after_actual: &empty_x,
            opponent_after_actual: &empty_o,
            mover_after_best: &empty_x,
            opponent_after_best: &empty_o,
        };
        assert_eq!(MistakeClassifier::categorize(&ctx), MistakeCategory::Positional);
    }
}
