use serde::{Deserialize, Serialize};

use crate::analysis::types::{GameMetadata, Language, MoveClassification};
use crate::core::board::Stone;
use crate::threats::types::{ThreatKind, ThreatResult};

/// Cultural scenario tags the template registry may render with idioms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalScenario {
    MissedWin,
    Fork,
    BraveDefense,
}

/// Structured request for the downstream comment renderer. The engine never
/// interpolates user-visible sentences; it only states the facts a template
/// needs, plus the target language tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub classification: Option<MoveClassification>,
    /// Threat kinds the move created, strongest first.
    pub threats_created: Vec<ThreatKind>,
    /// Opponent threat kinds the move removed, strongest first.
    pub threats_blocked: Vec<ThreatKind>,
    pub is_winning: bool,
    pub is_forced: bool,
    /// Better-move cell in notation, present for blunders.
    pub better_move: Option<String>,
    pub scenario: Option<CulturalScenario>,
    /// Simplified vocabulary for lower-rated players.
    pub simple_vocabulary: bool,
    pub language: Language,
}

impl CommentRequest {
    /// Assemble the request from the threat picture around one move.
    #[allow(clippy::too_many_arguments)]
    pub fn for_move(
        classification: MoveClassification,
        mover_threats_after: &ThreatResult,
        opponent_threats_before: &ThreatResult,
        opponent_threats_after: &ThreatResult,
        better_move: Option<String>,
        metadata: &GameMetadata,
        stone: Stone,
    ) -> Self {
        let threats_created = mover_threats_after.kinds_present();
        let threats_blocked = blocked_kinds(opponent_threats_before, opponent_threats_after);

        let is_winning = mover_threats_after.has(ThreatKind::Five);
        let is_forced = opponent_threats_before.has(ThreatKind::OpenFour)
            || opponent_threats_before.has(ThreatKind::Four);

        let scenario = if classification == MoveClassification::Blunder && better_move.is_some() {
            Some(CulturalScenario::MissedWin)
        } else if threats_created.len() >= 2 {
            Some(CulturalScenario::Fork)
        } else if !threats_blocked.is_empty() && classification <= MoveClassification::Okay {
            Some(CulturalScenario::BraveDefense)
        } else {
            None
        };

        Self {
            classification: Some(classification),
            threats_created,
            threats_blocked,
            is_winning,
            is_forced,
            better_move,
            scenario,
            simple_vocabulary: metadata.use_simple_vocabulary(stone),
            language: metadata.language,
        }
    }
}

/// Opponent threat kinds whose count dropped across the move.
pub fn blocked_kinds(before: &ThreatResult, after: &ThreatResult) -> Vec<ThreatKind> {
    [
        ThreatKind::OpenFour,
        ThreatKind::Four,
        ThreatKind::BrokenFour,
        ThreatKind::OpenThree,
        ThreatKind::Three,
        ThreatKind::BrokenThree,
    ]
    .into_iter()
    .filter(|&kind| after.count(kind) < before.count(kind))
    .collect()
}
