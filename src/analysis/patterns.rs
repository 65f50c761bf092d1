use std::collections::HashSet;

use crate::analysis::types::{GamePattern, GamePatternKind, Move, PatternSeverity};
use crate::core::board::Board;
use crate::search::minimax::ScoredMove;
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{ThreatKind, ThreatResult};

/// Game-level pattern sweep over a finished timeline. Replays the move list
/// and reports tactical motifs (forks, double threes, four-three builds),
/// defensive feats, and the two failure motifs: late blocks and missed wins.
pub struct PatternDetector;

impl PatternDetector {
    /// `best_per_ply[i]` is the strongest pre-move candidate computed for
    /// ply i, used to spot missed wins.
    pub fn detect(moves: &[Move], best_per_ply: &[Option<ScoredMove>]) -> Vec<GamePattern> {
        let mut patterns = Vec::new();
        let mut board = Board::new();

        for (i, mv) in moves.iter().enumerate() {
            let move_number = i + 1;
            let opponent = mv.stone.opponent();

            let opp_before = ThreatDetector::detect(&board, opponent);
            let own_before = ThreatDetector::detect(&board, mv.stone);

            board.place(mv.row, mv.col, mv.stone);

            let threats = ThreatDetector::detect(&board, mv.stone);
            let opp_after = ThreatDetector::detect(&board, opponent);

            Self::attack_patterns(&threats, move_number, &mut patterns);

            if i > 0 {
                Self::missed_win(moves, best_per_ply, i, &board, move_number, &mut patterns);
                Self::late_block(&opp_before, &opp_after, move_number, &mut patterns);
                Self::defensive_patterns(
                    mv,
                    &own_before,
                    &threats,
                    &opp_before,
                    &opp_after,
                    move_number,
                    &mut patterns,
                );
            }
        }

        patterns
    }

    fn attack_patterns(threats: &ThreatResult, move_number: usize, out: &mut Vec<GamePattern>) {
        // Threats fanned out over three or more directions.
        if threats.threats.len() >= 4 {
            let directions: HashSet<_> = threats.threats.iter().map(|t| t.direction).collect();
            if directions.len() >= 3 {
                out.push(GamePattern {
                    kind: GamePatternKind::MultiDirectional,
                    moves: vec![move_number],
                    severity: PatternSeverity::High,
                });
            }
        }

        // Two threats in one direction on distinct parallel lines.
        'directions: for direction in crate::core::patterns::DIRECTIONS {
            let in_direction: Vec<_> =
                threats.threats.iter().filter(|t| t.direction == direction).collect();
            if in_direction.len() >= 2 {
                let anchors: HashSet<_> =
                    in_direction.iter().filter_map(|t| t.positions.first()).collect();
                if anchors.len() >= 2 {
                    out.push(GamePattern {
                        kind: GamePatternKind::ParallelLines,
                        moves: vec![move_number],
                        severity: PatternSeverity::High,
                    });
                    break 'directions;
                }
            }
        }

        if threats.count(ThreatKind::OpenThree) >= 2 {
            out.push(GamePattern {
                kind: GamePatternKind::DoubleThree,
                moves: vec![move_number],
                severity: PatternSeverity::High,
            });
        }

        let has_four = threats.has(ThreatKind::Four) || threats.has(ThreatKind::OpenFour);
        let has_three = threats.has(ThreatKind::Three) || threats.has(ThreatKind::OpenThree);
        if has_four && has_three {
            out.push(GamePattern {
                kind: GamePatternKind::FourThree,
                moves: vec![move_number],
                severity: PatternSeverity::Critical,
            });
        }
    }

    /// Would the previous player's best candidate have completed a five?
    fn missed_win(
        moves: &[Move],
        best_per_ply: &[Option<ScoredMove>],
        i: usize,
        board_after: &Board,
        move_number: usize,
        out: &mut Vec<GamePattern>,
    ) {
        let Some(Some(best)) = best_per_ply.get(i - 1) else {
            return;
        };
        let prev = moves[i - 1];
        if (best.row, best.col) == (prev.row, prev.col) {
            return;
        }

        let mut test_board = board_after.clone();
        test_board.remove(moves[i].row, moves[i].col);
        if !test_board.is_empty_at(best.row, best.col) {
            return;
        }
        test_board.place(best.row, best.col, prev.stone);

        if ThreatDetector::detect(&test_board, prev.stone).has(ThreatKind::Five) {
            // Reported on the ply after the miss, once the win is provably
            // gone.
            out.push(GamePattern {
                kind: GamePatternKind::MissedWin,
                moves: vec![move_number],
                severity: PatternSeverity::Critical,
            });
        }
    }

    /// A standing opponent open four survived the move.
    fn late_block(
        opp_before: &ThreatResult,
        opp_after: &ThreatResult,
        move_number: usize,
        out: &mut Vec<GamePattern>,
    ) {
        if opp_before.has(ThreatKind::OpenFour) && opp_after.has(ThreatKind::OpenFour) {
            out.push(GamePattern {
                kind: GamePatternKind::LateBlock,
                moves: vec![move_number],
                severity: PatternSeverity::Major,
            });
        }
    }

    fn defensive_patterns(
        mv: &Move,
        own_before: &ThreatResult,
        own_after: &ThreatResult,
        opp_before: &ThreatResult,
        opp_after: &ThreatResult,
        move_number: usize,
        out: &mut Vec<GamePattern>,
    ) {
        let blocked = Self::significant_threats(opp_before) as i32
            - Self::significant_threats(opp_after) as i32;

        if blocked >= 2 {
            out.push(GamePattern {
                kind: GamePatternKind::DoubleBlock,
                moves: vec![move_number],
                severity: PatternSeverity::High,
            });
        }

        if blocked >= 1 {
            let counter = own_after.count(ThreatKind::OpenThree)
                > own_before.count(ThreatKind::OpenThree)
                || Self::gained_four(own_before, own_after);
            if counter {
                out.push(GamePattern {
                    kind: GamePatternKind::CounterBlock,
                    moves: vec![move_number],
                    severity: PatternSeverity::High,
                });
            }
        }

        // Occupying the key cell of an opponent double threat before it
        // lands.
        let preempted = opp_before
            .double_threats
            .iter()
            .any(|d| d.key_position == (mv.row, mv.col));
        if preempted {
            out.push(GamePattern {
                kind: GamePatternKind::PreventiveBlock,
                moves: vec![move_number],
                severity: PatternSeverity::Medium,
            });
        }
    }

    fn significant_threats(threats: &ThreatResult) -> u32 {
        threats.count(ThreatKind::OpenFour)
            + threats.count(ThreatKind::Four)
            + threats.count(ThreatKind::BrokenFour)
            + threats.count(ThreatKind::OpenThree)
    }

    fn gained_four(before: &ThreatResult, after: &ThreatResult) -> bool {
        [ThreatKind::OpenFour, ThreatKind::Four, ThreatKind::BrokenFour]
            .into_iter()
            .any(|kind| after.count(kind) > before.count(kind))
    }
}
