use serde::{Deserialize, Serialize};

use crate::analysis::types::{MistakeSeverity, Move};
use crate::core::board::Stone;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningKind {
    /// Second move orthogonally adjacent to the center.
    RenjuDirect,
    /// Second move diagonally adjacent to the center.
    RenjuIndirect,
    FreeStyle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningEvaluation {
    Winning,
    Advantage,
    Balanced,
    Disadvantage,
}

/// Strategic idea tags; the comment layer renders them per language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyIdea {
    DiagonalDevelopment,
    HorizontalPressure,
    VerticalPressure,
    EarlyBlockNeeded,
    ManyForcingLines,
    SafeDevelopment,
    FlexibleShape,
    CenterControl,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonMistake {
    pub move_number: usize,
    pub wrong_move: (usize, usize),
    pub correct_move: (usize, usize),
    pub severity: MistakeSeverity,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    /// Romanized Renju name.
    pub name: &'static str,
    pub name_en: &'static str,
    pub kind: OpeningKind,
    pub moves: Vec<Move>,
    pub evaluation: OpeningEvaluation,
    /// -100..100, positive favors Black.
    pub evaluation_score: i32,
    pub key_ideas: Vec<KeyIdea>,
    pub common_mistakes: Vec<CommonMistake>,
}

/// Static opening index. Built once at startup, read-only afterwards; safe
/// to share by reference.
pub struct OpeningBook {
    openings: Vec<Opening>,
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::new()
    }
}

fn seq(cells: &[(usize, usize)]) -> Vec<Move> {
    cells
        .iter()
        .enumerate()
        .map(|(i, &(row, col))| {
            let stone = if i % 2 == 0 { Stone::X } else { Stone::O };
            Move::new(row, col, stone)
        })
        .collect()
}

impl OpeningBook {
    pub fn new() -> Self {
        let mut openings = Vec::new();

        // Direct openings: White answers at (8, 7), the third move names
        // the opening.
        openings.push(Opening {
            name: "Kansei",
            name_en: "Cold Star",
            kind: OpeningKind::RenjuDirect,
            moves: seq(&[(7, 7), (8, 7), (6, 6)]),
            evaluation: OpeningEvaluation::Balanced,
            evaluation_score: 5,
            key_ideas: vec![KeyIdea::DiagonalDevelopment, KeyIdea::EarlyBlockNeeded],
            common_mistakes: vec![CommonMistake {
                move_number: 4,
                wrong_move: (9, 7),
                correct_move: (6, 7),
                severity: MistakeSeverity::Major,
            }],
        });

        openings.push(Opening {
            name: "Kagetsu",
            name_en: "Flower Moon",
            kind: OpeningKind::RenjuDirect,
            moves: seq(&[(7, 7), (8, 7), (6, 7)]),
            evaluation: OpeningEvaluation::Advantage,
            evaluation_score: 15,
            key_ideas: vec![KeyIdea::VerticalPressure, KeyIdea::ManyForcingLines],
            common_mistakes: vec![CommonMistake {
                move_number: 4,
                wrong_move: (5, 7),
                correct_move: (6, 6),
                severity: MistakeSeverity::Critical,
            }],
        });

        openings.push(Opening {
            name: "Suigetsu",
            name_en: "Water Moon",
            kind: OpeningKind::RenjuDirect,
            moves: seq(&[(7, 7), (8, 7), (8, 6)]),
            evaluation: OpeningEvaluation::Balanced,
            evaluation_score: 8,
            key_ideas: vec![KeyIdea::FlexibleShape, KeyIdea::DiagonalDevelopment],
            common_mistakes: Vec::new(),
        });

        openings.push(Opening {
            name: "Sangetsu",
            name_en: "Mountain Moon",
            kind: OpeningKind::RenjuDirect,
            moves: seq(&[(7, 7), (8, 7), (8, 8)]),
            evaluation: OpeningEvaluation::Balanced,
            evaluation_score: 3,
            key_ideas: vec![KeyIdea::SafeDevelopment],
            common_mistakes: Vec::new(),
        });

        openings.push(Opening {
            name: "Shingetsu",
            name_en: "New Moon",
            kind: OpeningKind::RenjuDirect,
            moves: seq(&[(7, 7), (8, 7), (6, 8)]),
            evaluation: OpeningEvaluation::Advantage,
            evaluation_score: 12,
            key_ideas: vec![KeyIdea::DiagonalDevelopment, KeyIdea::ManyForcingLines],
            common_mistakes: Vec::new(),
        });

        openings.push(Opening {
            name: "Zangetsu",
            name_en: "Lingering Moon",
            kind: OpeningKind::RenjuDirect,
            moves: seq(&[(7, 7), (8, 7), (5, 7)]),
            evaluation: OpeningEvaluation::Balanced,
            evaluation_score: 6,
            key_ideas: vec![KeyIdea::VerticalPressure, KeyIdea::SafeDevelopment],
            common_mistakes: Vec::new(),
        });

        // Indirect openings: White answers at (8, 8).
        openings.push(Opening {
            name: "Kanzan",
            name_en: "Cold Mountain",
            kind: OpeningKind::RenjuIndirect,
            moves: seq(&[(7, 7), (8, 8), (6, 6)]),
            evaluation: OpeningEvaluation::Balanced,
            evaluation_score: 4,
            key_ideas: vec![KeyIdea::DiagonalDevelopment, KeyIdea::FlexibleShape],
            common_mistakes: Vec::new(),
        });

        openings.push(Opening {
            name: "Meigetsu",
            name_en: "Bright Moon",
            kind: OpeningKind::RenjuIndirect,
            moves: seq(&[(7, 7), (8, 8), (6, 8)]),
            evaluation: OpeningEvaluation::Advantage,
            evaluation_score: 18,
            key_ideas: vec![KeyIdea::ManyForcingLines, KeyIdea::CenterControl],
            common_mistakes: vec![CommonMistake {
                move_number: 4,
                wrong_move: (9, 9),
                correct_move: (7, 8),
                severity: MistakeSeverity::Major,
            }],
        });

        openings.push(Opening {
            name: "Hangetsu",
            name_en: "Half Moon",
            kind: OpeningKind::RenjuIndirect,
            moves: seq(&[(7, 7), (8, 8), (5, 5)]),
            evaluation: OpeningEvaluation::Disadvantage,
            evaluation_score: -8,
            key_ideas: vec![KeyIdea::SafeDevelopment, KeyIdea::EarlyBlockNeeded],
            common_mistakes: Vec::new(),
        });

        openings.push(Opening {
            name: "Suisei",
            name_en: "Water Star",
            kind: OpeningKind::RenjuIndirect,
            moves: seq(&[(7, 7), (8, 8), (7, 9)]),
            evaluation: OpeningEvaluation::Balanced,
            evaluation_score: 2,
            key_ideas: vec![KeyIdea::HorizontalPressure, KeyIdea::FlexibleShape],
            common_mistakes: Vec::new(),
        });

        // Free-style lines seen outside Renju rules.
        openings.push(Opening {
            name: "Side Start",
            name_en: "Side Start",
            kind: OpeningKind::FreeStyle,
            moves: seq(&[(7, 7), (7, 8), (7, 6)]),
            evaluation: OpeningEvaluation::Advantage,
            evaluation_score: 10,
            key_ideas: vec![KeyIdea::HorizontalPressure, KeyIdea::CenterControl],
            common_mistakes: Vec::new(),
        });

        Self { openings }
    }

    pub fn all(&self) -> &[Opening] {
        &self.openings
    }

    pub fn get(&self, name: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.name.eq_ignore_ascii_case(name))
    }

    pub fn by_kind(&self, kind: OpeningKind) -> impl Iterator<Item = &Opening> {
        self.openings.iter().filter(move |o| o.kind == kind)
    }

    /// Identify the opening whose full move list is a prefix of the game.
    /// Needs at least the first three moves.
    pub fn identify(&self, moves: &[Move]) -> Option<&Opening> {
        if moves.len() < 3 {
            return None;
        }
        self.openings
            .iter()
            .filter(|o| moves.len() >= o.moves.len())
            .find(|o| {
                o.moves
                    .iter()
                    .zip(moves)
                    .all(|(a, b)| a.row == b.row && a.col == b.col && a.stone == b.stone)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_kagetsu() {
        let book = OpeningBook::new();
        let moves = seq(&[(7, 7), (8, 7), (6, 7), (6, 6), (5, 7)]);
        let opening = book.identify(&moves).expect("kagetsu prefix should match");
        assert_eq!(opening.name, "Kagetsu");
        assert_eq!(opening.evaluation, OpeningEvaluation::Advantage);
    }

    #[test]
    fn test_identify_needs_three_moves() {
        let book = OpeningBook::new();
        let moves = seq(&[(7, 7), (8, 7)]);
        assert!(book.identify(&moves).is_none());
    }

    #[test]
    fn test_unknown_line_is_none() {
        let book = OpeningBook::new();
        let moves = seq(&[(0, 0), (1, 1), (2, 2)]);
        assert!(book.identify(&moves).is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        let book = OpeningBook::new();
        assert!(book.get("meigetsu").is_some());
        assert!(book.get("nonexistent").is_none());
        assert!(book.by_kind(OpeningKind::RenjuDirect).count() >= 5);
    }

    #[test]
    fn test_all_openings_start_at_center() {
        let book = OpeningBook::new();
        for opening in book.all() {
            assert_eq!((opening.moves[0].row, opening.moves[0].col), (7, 7), "{}", opening.name);
            assert!(opening.moves.len() >= 3);
            assert!((-100..=100).contains(&opening.evaluation_score));
        }
    }
}
