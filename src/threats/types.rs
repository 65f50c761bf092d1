use serde::{Deserialize, Serialize};

use crate::core::board::Stone;
use crate::core::patterns::Direction;

/// Single-line threat shapes, strongest first. The discriminant order is the
/// priority order used throughout the search code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    Five,
    OpenFour,
    Four,
    BrokenFour,
    OpenThree,
    Three,
    BrokenThree,
    JumpThree,
    OpenTwo,
}

pub const THREAT_KINDS: [ThreatKind; 9] = [
    ThreatKind::Five,
    ThreatKind::OpenFour,
    ThreatKind::Four,
    ThreatKind::BrokenFour,
    ThreatKind::OpenThree,
    ThreatKind::Three,
    ThreatKind::BrokenThree,
    ThreatKind::JumpThree,
    ThreatKind::OpenTwo,
];

impl ThreatKind {
    /// Fixed weight table; stable across versions.
    pub const fn weight(&self) -> i32 {
        match self {
            ThreatKind::Five => 100_000,
            ThreatKind::OpenFour => 10_000,
            ThreatKind::Four => 1_000,
            ThreatKind::BrokenFour => 900,
            ThreatKind::OpenThree => 500,
            ThreatKind::Three => 100,
            ThreatKind::BrokenThree => 80,
            ThreatKind::JumpThree => 40,
            ThreatKind::OpenTwo => 10,
        }
    }

    #[inline]
    pub const fn table_index(&self) -> usize {
        *self as usize
    }

    /// Four-type threats force an immediate reply.
    pub fn is_four_type(&self) -> bool {
        matches!(self, ThreatKind::Four | ThreatKind::OpenFour | ThreatKind::BrokenFour)
    }

    pub fn is_three_type(&self) -> bool {
        matches!(self, ThreatKind::OpenThree | ThreatKind::Three | ThreatKind::BrokenThree)
    }

    /// Patterns carrying one or two interior gaps in their window.
    pub fn has_gaps(&self) -> bool {
        matches!(
            self,
            ThreatKind::BrokenFour | ThreatKind::BrokenThree | ThreatKind::JumpThree
        )
    }
}

/// Double threats, strongest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleThreatKind {
    DoubleFour,
    FourThree,
    DoubleThree,
}

pub const DOUBLE_THREAT_KINDS: [DoubleThreatKind; 3] = [
    DoubleThreatKind::DoubleFour,
    DoubleThreatKind::FourThree,
    DoubleThreatKind::DoubleThree,
];

impl DoubleThreatKind {
    pub const fn weight(&self) -> i32 {
        match self {
            DoubleThreatKind::DoubleFour => 9_000,
            DoubleThreatKind::FourThree => 4_500,
            DoubleThreatKind::DoubleThree => 1_000,
        }
    }

    #[inline]
    pub const fn table_index(&self) -> usize {
        *self as usize
    }

    pub const fn severity(&self) -> DoubleThreatSeverity {
        match self {
            DoubleThreatKind::DoubleFour | DoubleThreatKind::FourThree => {
                DoubleThreatSeverity::Critical
            }
            DoubleThreatKind::DoubleThree => DoubleThreatSeverity::Major,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleThreatSeverity {
    Critical,
    Major,
}

/// One detected pattern: a stone color on one line, with its (deduplicated,
/// line-ordered) cell set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub kind: ThreatKind,
    pub stone: Stone,
    pub direction: Direction,
    pub positions: Vec<(usize, usize)>,
}

/// Two threats in different directions sharing an empty extension cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleThreat {
    pub kind: DoubleThreatKind,
    /// The shared empty cell that realizes both threats.
    pub key_position: (usize, usize),
    pub first: Threat,
    pub second: Threat,
    pub severity: DoubleThreatSeverity,
}

/// Full recognition output for one (board, stone) query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatResult {
    counts: [u32; 9],
    double_counts: [u32; 3],
    pub threats: Vec<Threat>,
    pub double_threats: Vec<DoubleThreat>,
    pub score: i32,
}

impl ThreatResult {
    pub fn new(threats: Vec<Threat>, double_threats: Vec<DoubleThreat>) -> Self {
        let mut counts = [0u32; 9];
        for threat in &threats {
            counts[threat.kind.table_index()] += 1;
        }
        let mut double_counts = [0u32; 3];
        for double in &double_threats {
            double_counts[double.kind.table_index()] += 1;
        }

        let mut score = 0i32;
        for kind in THREAT_KINDS {
            score += counts[kind.table_index()] as i32 * kind.weight();
        }
        for kind in DOUBLE_THREAT_KINDS {
            score += double_counts[kind.table_index()] as i32 * kind.weight();
        }

        Self { counts, double_counts, threats, double_threats, score }
    }

    #[inline]
    pub fn count(&self, kind: ThreatKind) -> u32 {
        self.counts[kind.table_index()]
    }

    #[inline]
    pub fn has(&self, kind: ThreatKind) -> bool {
        self.count(kind) > 0
    }

    #[inline]
    pub fn double_count(&self, kind: DoubleThreatKind) -> u32 {
        self.double_counts[kind.table_index()]
    }

    pub fn double_total(&self) -> u32 {
        self.double_counts.iter().sum()
    }

    /// Any five / four-type threat on the board.
    pub fn has_forcing(&self) -> bool {
        self.has(ThreatKind::Five)
            || self.has(ThreatKind::OpenFour)
            || self.has(ThreatKind::Four)
            || self.has(ThreatKind::BrokenFour)
    }

    pub fn has_pressure(&self) -> bool {
        self.has(ThreatKind::OpenThree)
            || self.has(ThreatKind::Three)
            || self.has(ThreatKind::BrokenThree)
    }

    /// Threat kinds present, strongest first.
    pub fn kinds_present(&self) -> Vec<ThreatKind> {
        THREAT_KINDS.iter().copied().filter(|k| self.has(*k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_ordering_spans_magnitudes() {
        let weights: Vec<i32> = THREAT_KINDS.iter().map(|k| k.weight()).collect();
        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1], "weights must strictly decrease: {pair:?}");
        }
        assert!(ThreatKind::Five.weight() / ThreatKind::OpenTwo.weight() >= 10_000);
        assert_eq!(ThreatKind::Four.weight(), DoubleThreatKind::DoubleThree.weight());
    }

    #[test]
    fn test_result_score_sums_weights() {
        let threat = Threat {
            kind: ThreatKind::OpenThree,
            stone: Stone::X,
            direction: Direction::Horizontal,
            positions: vec![(7, 6), (7, 7), (7, 8)],
        };
        let result = ThreatResult::new(vec![threat.clone(), Threat {
            kind: ThreatKind::Four,
            direction: Direction::Vertical,
            positions: vec![(4, 2), (5, 2), (6, 2), (7, 2)],
            ..threat
        }], Vec::new());
        assert_eq!(result.score, 500 + 1_000);
        assert_eq!(result.count(ThreatKind::OpenThree), 1);
        assert_eq!(result.count(ThreatKind::Four), 1);
        assert!(result.has_forcing());
    }

    #[test]
    fn test_double_threat_severity() {
        assert_eq!(DoubleThreatKind::DoubleFour.severity(), DoubleThreatSeverity::Critical);
        assert_eq!(DoubleThreatKind::FourThree.severity(), DoubleThreatSeverity::Critical);
        assert_eq!(DoubleThreatKind::DoubleThree.severity(), DoubleThreatSeverity::Major);
    }
}
