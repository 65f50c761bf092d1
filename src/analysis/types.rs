use serde::{Deserialize, Serialize};

use crate::core::board::{BoardError, Stone};
use crate::core::coords::{format_notation, parse_notation, CoordError};
use crate::threats::types::ThreatKind;

/// One move of a game. The ordinal is implicit (1-based position in the
/// move list).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub stone: Stone,
}

impl Move {
    pub fn new(row: usize, col: usize, stone: Stone) -> Self {
        Self { row, col, stone }
    }

    pub fn from_notation(notation: &str, stone: Stone) -> Result<Self, CoordError> {
        let (row, col) = parse_notation(notation)?;
        Ok(Self { row, col, stone })
    }

    pub fn notation(&self) -> String {
        format_notation(self.row, self.col).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveClassification {
    Excellent,
    Good,
    Okay,
    Weak,
    Blunder,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeSeverity {
    Minor,
    Major,
    Critical,
}

/// The four mistake dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeCategory {
    Tactical,
    Positional,
    Strategic,
    Tempo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mistake {
    /// 1-based move ordinal.
    pub move_number: usize,
    pub stone: Stone,
    pub severity: MistakeSeverity,
    pub category: MistakeCategory,
    /// Terse technical description; user-facing prose is rendered
    /// downstream from the category and the better move.
    pub description: String,
    pub better_move: (usize, usize),
    pub score_loss: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initiative {
    X,
    O,
    Neutral,
}

impl Initiative {
    pub fn from_stone(stone: Stone) -> Self {
        match stone {
            Stone::X => Initiative::X,
            Stone::O => Initiative::O,
        }
    }

    pub fn stone(&self) -> Option<Stone> {
        match self {
            Initiative::X => Some(Stone::X),
            Initiative::O => Some(Stone::O),
            Initiative::Neutral => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoStatus {
    Forcing,
    Neutral,
    Slow,
}

/// Per-move tempo verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoRecord {
    pub is_forcing: bool,
    /// +1 gained initiative, -1 lost it, 0 otherwise.
    pub tempo_delta: i32,
    pub initiative: Initiative,
    /// True when the holder changed to a non-neutral player.
    pub is_switch: bool,
    pub status: TempoStatus,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Attacker,
    Defender,
    Neutral,
}

/// Why a suggested move is good.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    Wins,
    Forces,
    Blocks,
    Develops,
    Positional,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeMove {
    pub row: usize,
    pub col: usize,
    pub notation: String,
    pub score: i32,
    pub reason: MoveReason,
    /// Highlighted when the played move was a blunder.
    pub is_best: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMove {
    pub row: usize,
    pub col: usize,
    pub notation: String,
    pub score: i32,
    pub reason: MoveReason,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// 1-based move ordinal.
    pub move_number: usize,
    pub stone: Stone,
    pub row: usize,
    pub col: usize,
    pub notation: String,
    /// Post-move evaluation for the mover.
    pub score: i32,
    pub win_probability: f64,
    pub classification: MoveClassification,
    /// Opponent threat kinds still standing after this move.
    pub opponent_context: Vec<ThreatKind>,
    pub role: Role,
    pub tempo: TempoRecord,
    pub alternatives: Vec<AlternativeMove>,
    pub comment: crate::analysis::comments::CommentRequest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSeverity {
    Info,
    Medium,
    Major,
    High,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GamePatternKind {
    /// Threats spanning three or more directions after one move.
    MultiDirectional,
    /// Two same-direction threats on distinct parallel lines.
    ParallelLines,
    DoubleThree,
    FourThree,
    /// A standing opponent open four was left unanswered.
    LateBlock,
    /// The previous player had a five-completing move and played elsewhere.
    MissedWin,
    /// One move reduced two or more distinct opponent threats.
    DoubleBlock,
    /// A block that also created an open three or better.
    CounterBlock,
    /// Occupied the key cell of an opponent double threat in advance.
    PreventiveBlock,
    Opening { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePattern {
    #[serde(flatten)]
    pub kind: GamePatternKind,
    /// 1-based move ordinals exhibiting the pattern.
    pub moves: Vec<usize>,
    pub severity: PatternSeverity,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_moves: usize,
    pub excellent: usize,
    pub good: usize,
    pub okay: usize,
    pub weak: usize,
    pub blunders: usize,
    pub mistakes: usize,
    pub critical_mistakes: usize,
    pub average_score: i32,
    /// (excellent + good) / total * 100.
    pub accuracy: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoStats {
    pub x_forcing_moves: usize,
    pub o_forcing_moves: usize,
    pub x_slow_moves: usize,
    pub o_slow_moves: usize,
    pub switches: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Insight {
    Winner { stone: Stone },
    Unfinished,
    CriticalMistakes { count: usize },
    MoreAccuratePlayer { stone: Stone },
    TurningPoint { move_number: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_moves: usize,
    pub winner: Option<Stone>,
    pub x_stats: PlayerStats,
    pub o_stats: PlayerStats,
    pub tempo: TempoStats,
    pub insights: Vec<Insight>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTier {
    Fast,
    Deep,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Tournament,
    Ranked,
    #[default]
    Casual,
}

impl GameType {
    /// Mistake thresholds scale by ±20% with game type, as an integer
    /// ratio.
    pub const fn strictness(&self) -> (i32, i32) {
        match self {
            GameType::Tournament => (12, 10),
            GameType::Ranked => (10, 10),
            GameType::Casual => (8, 10),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVariant {
    #[default]
    Standard,
    Renju,
    Caro,
}

/// Output language tags; downstream renderers map them to localized text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
    Zh,
    Ja,
}

/// Vocabulary is simplified for players rated below this.
pub const SIMPLE_VOCABULARY_RATING: u32 = 1200;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    pub game_type: GameType,
    pub rule_variant: RuleVariant,
    pub black_rating: Option<u32>,
    pub white_rating: Option<u32>,
    pub language: Language,
}

impl GameMetadata {
    pub fn rating_of(&self, stone: Stone) -> Option<u32> {
        match stone {
            Stone::X => self.black_rating,
            Stone::O => self.white_rating,
        }
    }

    pub fn use_simple_vocabulary(&self, stone: Stone) -> bool {
        match self.rating_of(stone) {
            Some(rating) => rating < SIMPLE_VOCABULARY_RATING,
            None => true,
        }
    }

    pub fn adjust_score(&self, score: i32) -> i32 {
        let (num, den) = self.game_type.strictness();
        (score.saturating_mul(num)) / den
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub tier: AnalysisTier,
    pub timeline: Vec<TimelineEntry>,
    pub mistakes: Vec<Mistake>,
    pub patterns: Vec<GamePattern>,
    pub best_move: Option<BestMove>,
    pub summary: Summary,
    pub duration_ms: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceViolation {
    OutOfBounds,
    OccupiedCell,
    /// Two moves by the same color in a row.
    WrongTurnOrder,
}

/// Typed failures surfaced at the analyzer boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    InvalidCoordinate(CoordError),
    InvalidBoard(BoardError),
    InvalidMoveSequence { ordinal: usize, violation: SequenceViolation },
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InvalidCoordinate(err) => write!(f, "invalid coordinate: {err}"),
            AnalysisError::InvalidBoard(err) => write!(f, "invalid board: {err}"),
            AnalysisError::InvalidMoveSequence { ordinal, violation } => {
                let what = match violation {
                    SequenceViolation::OutOfBounds => "lands outside the board",
                    SequenceViolation::OccupiedCell => "lands on an occupied cell",
                    SequenceViolation::WrongTurnOrder => "breaks the turn order",
                };
                write!(f, "move {ordinal} {what}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<CoordError> for AnalysisError {
    fn from(err: CoordError) -> Self {
        AnalysisError::InvalidCoordinate(err)
    }
}

impl From<BoardError> for AnalysisError {
    fn from(err: BoardError) -> Self {
        AnalysisError::InvalidBoard(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_from_notation() {
        let mv = Move::from_notation("h8", Stone::X).unwrap();
        assert_eq!((mv.row, mv.col), (7, 7));
        assert_eq!(mv.notation(), "H8");
    }

    #[test]
    fn test_strictness_ratios() {
        assert_eq!(GameType::Tournament.strictness(), (12, 10));
        assert_eq!(GameType::Casual.strictness(), (8, 10));
        let metadata = GameMetadata { game_type: GameType::Tournament, ..Default::default() };
        assert_eq!(metadata.adjust_score(1000), 1200);
    }

    #[test]
    fn test_simple_vocabulary_threshold() {
        let metadata = GameMetadata {
            black_rating: Some(1100),
            white_rating: Some(1500),
            ..Default::default()
        };
        assert!(metadata.use_simple_vocabulary(Stone::X));
        assert!(!metadata.use_simple_vocabulary(Stone::O));
    }

    #[test]
    fn test_language_tags_serialize() {
        assert_eq!(serde_json::to_string(&Language::Vi).unwrap(), "\"vi\"");
        assert_eq!(serde_json::to_string(&Language::Ja).unwrap(), "\"ja\"");
    }

    #[test]
    fn test_error_display_carries_ordinal() {
        let err = AnalysisError::InvalidMoveSequence {
            ordinal: 12,
            violation: SequenceViolation::OccupiedCell,
        };
        assert!(err.to_string().contains("12"));
    }
}
