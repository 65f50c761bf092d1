use crate::analysis::types::{Initiative, Role, TempoRecord, TempoStatus};
use crate::core::board::{Board, Stone};
use crate::core::coords::CENTER;
use crate::eval::position::PositionEvaluator;
use crate::threats::detector::ThreatDetector;
use crate::threats::types::{ThreatKind, ThreatResult};

/// Threat-score margin for the attacker/defender roles.
pub const ROLE_THRESHOLD: i32 = 500;

/// Per-move initiative analysis. Tempo state threads through the timeline:
/// each verdict depends on who held the initiative before the move, so a
/// game is always analyzed move by move, in order.
pub struct TempoAnalyzer;

impl TempoAnalyzer {
    /// Judge one move from the threat pictures before and after it.
    pub fn analyze(
        mover_before: &ThreatResult,
        mover_after: &ThreatResult,
        opponent_before: &ThreatResult,
        opponent_after: &ThreatResult,
        stone: Stone,
        previous_initiative: Initiative,
    ) -> TempoRecord {
        let creates_forcing = Self::gained_forcing(mover_before, mover_after);
        let creates_fork = mover_after.double_total() > mover_before.double_total();
        let blocked_forcing = Self::reduced_forcing(opponent_before, opponent_after);
        let opponent_still_forcing = opponent_after.has_forcing();
        let mover_initiative = Initiative::from_stone(stone);
        let opponent_initiative = Initiative::from_stone(stone.opponent());

        let (status, tempo_delta, initiative) = if creates_forcing || creates_fork {
            let delta = if previous_initiative != mover_initiative { 1 } else { 0 };
            (TempoStatus::Forcing, delta, mover_initiative)
        } else if blocked_forcing && !opponent_still_forcing {
            (TempoStatus::Neutral, 0, Initiative::Neutral)
        } else if opponent_still_forcing {
            let delta = if previous_initiative == mover_initiative { -1 } else { 0 };
            (TempoStatus::Slow, delta, opponent_initiative)
        } else if Self::gained_pressure(mover_before, mover_after) {
            (TempoStatus::Neutral, 0, previous_initiative)
        } else {
            let delta = if previous_initiative == mover_initiative { -1 } else { 0 };
            let holder = if previous_initiative == mover_initiative {
                opponent_initiative
            } else {
                Initiative::Neutral
            };
            (TempoStatus::Slow, delta, holder)
        };

        TempoRecord {
            is_forcing: creates_forcing || creates_fork,
            tempo_delta,
            initiative,
            is_switch: initiative != previous_initiative && initiative != Initiative::Neutral,
            status,
        }
    }

    fn gained_forcing(before: &ThreatResult, after: &ThreatResult) -> bool {
        [
            ThreatKind::Five,
            ThreatKind::OpenFour,
            ThreatKind::Four,
            ThreatKind::BrokenFour,
        ]
        .into_iter()
        .any(|kind| after.count(kind) > before.count(kind))
    }

    fn gained_pressure(before: &ThreatResult, after: &ThreatResult) -> bool {
        [ThreatKind::OpenThree, ThreatKind::Three, ThreatKind::BrokenThree]
            .into_iter()
            .any(|kind| after.count(kind) > before.count(kind))
    }

    fn reduced_forcing(before: &ThreatResult, after: &ThreatResult) -> bool {
        [
            ThreatKind::Five,
            ThreatKind::OpenFour,
            ThreatKind::Four,
            ThreatKind::BrokenFour,
        ]
        .into_iter()
        .any(|kind| after.count(kind) < before.count(kind))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoleEvaluation {
    pub role: Role,
    pub score_diff: i32,
    /// 0-100 confidence in the assignment.
    pub confidence: u32,
}

/// Score breakdown for one move under a role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleScore {
    pub total: i32,
    pub threat_delta: i32,
    pub block_delta: i32,
    pub positional: i32,
    pub counter_attack_bonus: i32,
}

/// Attacker/defender determination and role-weighted move scoring.
pub struct RoleEvaluator;

impl RoleEvaluator {
    pub fn determine(board: &Board, stone: Stone) -> RoleEvaluation {
        let own = ThreatDetector::detect(board, stone);
        let opp = ThreatDetector::detect(board, stone.opponent());
        Self::determine_from(&own, &opp)
    }

    pub fn determine_from(own: &ThreatResult, opp: &ThreatResult) -> RoleEvaluation {
        let score_diff = own.score - opp.score;
        let (role, confidence) = if score_diff >= ROLE_THRESHOLD {
            (Role::Attacker, (score_diff * 100 / (ROLE_THRESHOLD * 2)).min(100) as u32)
        } else if score_diff <= -ROLE_THRESHOLD {
            (Role::Defender, (-score_diff * 100 / (ROLE_THRESHOLD * 2)).min(100) as u32)
        } else {
            let confidence = 100 - (score_diff.abs() * 100 / ROLE_THRESHOLD).min(100);
            (Role::Neutral, confidence as u32)
        };
        RoleEvaluation { role, score_diff, confidence }
    }

    /// Score a candidate move with role-dependent weights: attackers value
    /// threat creation, defenders value blocking, and a defensive move that
    /// also counter-attacks earns a capped bonus.
    pub fn score_move(board: &mut Board, row: usize, col: usize, stone: Stone, role: Role) -> RoleScore {
        let opponent = stone.opponent();
        let own_before = ThreatDetector::detect(board, stone);
        let opp_before = ThreatDetector::detect(board, opponent);

        board.place(row, col, stone);
        let own_after = ThreatDetector::detect(board, stone);
        let opp_after = ThreatDetector::detect(board, opponent);
        board.remove(row, col);

        let threat_delta = own_after.score - own_before.score;
        let block_delta = opp_before.score - opp_after.score;
        let positional = PositionEvaluator::position_bonus(row, col);

        let mut counter_attack_bonus = 0;
        if threat_delta > 0 && block_delta > 0 {
            counter_attack_bonus = (threat_delta.min(block_delta) * 3) / 10;
            if role == Role::Defender {
                counter_attack_bonus = (counter_attack_bonus * 3) / 2;
            }
            counter_attack_bonus = counter_attack_bonus.min(200);
        }

        let (weighted_threat, weighted_block, multiplier_num) = match role {
            Role::Attacker => ((threat_delta * 3) / 2, (block_delta * 4) / 5, 12),
            Role::Defender => ((threat_delta * 4) / 5, (block_delta * 3) / 2, 10),
            Role::Neutral => (threat_delta, block_delta, 10),
        };

        let total = (weighted_threat + weighted_block + positional + counter_attack_bonus)
            * multiplier_num
            / 10;

        RoleScore { total, threat_delta, block_delta, positional, counter_attack_bonus }
    }

    /// Position bonus helper used by the mistake classifier.
    pub fn center_distance(row: usize, col: usize) -> usize {
        crate::core::coords::manhattan_distance((row, col), CENTER)
    }
}
