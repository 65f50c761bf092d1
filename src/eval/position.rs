use serde::{Deserialize, Serialize};

use crate::core::board::{Board, Stone, BOARD_CELLS};
use crate::core::coords::{BOARD_SIZE, CENTER};
use crate::threats::detector::ThreatDetector;
use crate::threats::types::ThreatResult;

/// Opponent threat scores are discounted by this ratio (9/10 = 0.9).
const OPPONENT_WEIGHT_NUM: i32 = 9;
const OPPONENT_WEIGHT_DEN: i32 = 10;

const MAX_POSITION_BONUS: i32 = 50;
const BONUS_DECAY_PER_STEP: i32 = 5;

/// Positional bonus per cell, peaking at the board center and decaying with
/// Chebyshev distance.
pub const POSITION_BONUS: [i32; BOARD_CELLS] = build_position_bonus();

const fn build_position_bonus() -> [i32; BOARD_CELLS] {
    let mut table = [0i32; BOARD_CELLS];
    let mut row = 0;
    while row < BOARD_SIZE {
        let mut col = 0;
        while col < BOARD_SIZE {
            let dr = if row > CENTER.0 { row - CENTER.0 } else { CENTER.0 - row };
            let dc = if col > CENTER.1 { col - CENTER.1 } else { CENTER.1 - col };
            let dist = if dr > dc { dr } else { dc };
            let bonus = MAX_POSITION_BONUS - BONUS_DECAY_PER_STEP * dist as i32;
            table[row * BOARD_SIZE + col] = if bonus > 0 { bonus } else { 0 };
            col += 1;
        }
        row += 1;
    }
    table
}

/// Evaluation of one position from one player's point of view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub score: i32,
    pub win_probability: f64,
    pub threats: ThreatResult,
    pub opponent_threats: ThreatResult,
}

pub struct PositionEvaluator;

impl PositionEvaluator {
    #[inline]
    pub fn position_bonus(row: usize, col: usize) -> i32 {
        POSITION_BONUS[row * BOARD_SIZE + col]
    }

    /// Score = own threats − 0.9 · opponent threats + positional bonuses of
    /// the player's stones.
    pub fn evaluate(board: &Board, stone: Stone) -> Evaluation {
        let threats = ThreatDetector::detect(board, stone);
        let opponent_threats = ThreatDetector::detect(board, stone.opponent());
        let score = Self::combine(board, stone, &threats, &opponent_threats);

        Evaluation {
            score,
            win_probability: Self::win_probability(score),
            threats,
            opponent_threats,
        }
    }

    pub fn combine(
        board: &Board,
        stone: Stone,
        threats: &ThreatResult,
        opponent_threats: &ThreatResult,
    ) -> i32 {
        let positional: i32 = board
            .stones()
            .filter(|&(_, _, s)| s == stone)
            .map(|(row, col, _)| Self::position_bonus(row, col))
            .sum();

        threats.score - (opponent_threats.score * OPPONENT_WEIGHT_NUM) / OPPONENT_WEIGHT_DEN
            + positional
    }

    /// Score a hypothetical move. The stone is placed, the position is
    /// evaluated, and the board is reverted before returning.
    pub fn evaluate_move(board: &mut Board, row: usize, col: usize, stone: Stone) -> i32 {
        board.place(row, col, stone);
        let threats = ThreatDetector::detect(board, stone);
        let opponent_threats = ThreatDetector::detect(board, stone.opponent());
        let score = Self::combine(board, stone, &threats, &opponent_threats);
        board.remove(row, col);
        score
    }

    /// Logistic transform of the score, clamped to [0.05, 0.95]. The scale
    /// saturates around open-four-sized scores.
    pub fn win_probability(score: i32) -> f64 {
        let p = 1.0 / (1.0 + (-(score as f64) / 2500.0).exp());
        p.clamp(0.05, 0.95)
    }
}
