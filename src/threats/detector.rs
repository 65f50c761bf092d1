use std::collections::{BTreeMap, HashSet};

use crate::core::board::{Board, Stone};
use crate::core::patterns::{collect_line, Direction, DIRECTIONS};
use crate::threats::types::{
    DoubleThreat, DoubleThreatKind, Threat, ThreatKind, ThreatResult,
};

type LineCell = (usize, usize, Option<Stone>);

/// Scans the board for all threat patterns of one color.
///
/// Pure function of (board, stone): every line is walked once for contiguous
/// runs, then fixed-width windows pick up broken and jump shapes. Results are
/// deduplicated by position set and enriched with double-threat records.
pub struct ThreatDetector;

impl ThreatDetector {
    pub fn detect(board: &Board, stone: Stone) -> ThreatResult {
        let mut threats: Vec<Threat> = Vec::new();
        let mut seen: HashSet<Vec<(usize, usize)>> = HashSet::new();

        for direction in DIRECTIONS {
            for (start_row, start_col) in direction.line_starts() {
                let line = collect_line(board, start_row, start_col, direction);
                for threat in Self::scan_line(&line, stone, direction) {
                    let mut key = threat.positions.clone();
                    key.sort_unstable();
                    if seen.insert(key) {
                        threats.push(threat);
                    }
                }
            }
        }

        let double_threats = Self::detect_double_threats(board, &threats);
        ThreatResult::new(threats, double_threats)
    }

    /// Find every pattern on a single line. Broken/jump shapes are matched
    /// first so the contiguous pass stays a plain run scan.
    fn scan_line(line: &[LineCell], stone: Stone, direction: Direction) -> Vec<Threat> {
        let mut threats = Vec::new();
        let n = line.len();
        if n < 2 {
            return threats;
        }

        Self::scan_windows(line, stone, direction, &mut threats);

        let mut i = 0;
        while i < n {
            if line[i].2 != Some(stone) {
                i += 1;
                continue;
            }

            let start = i;
            let mut positions = Vec::new();
            while i < n && line[i].2 == Some(stone) {
                positions.push((line[i].0, line[i].1));
                i += 1;
            }
            let count = positions.len();

            let left_open = start > 0 && line[start - 1].2.is_none();
            let right_open = i < n && line[i].2.is_none();
            let open_ends = left_open as u32 + right_open as u32;

            if let Some(kind) = Self::classify_run(count, open_ends) {
                threats.push(Threat { kind, stone, direction, positions });
            }
        }

        threats
    }

    /// Run-length classification. Board edges and opponent stones both count
    /// as blocked ends.
    fn classify_run(count: usize, open_ends: u32) -> Option<ThreatKind> {
        match (count, open_ends) {
            (n, _) if n >= 5 => Some(ThreatKind::Five),
            (4, 2) => Some(ThreatKind::OpenFour),
            (4, 1) => Some(ThreatKind::Four),
            (3, 2) => Some(ThreatKind::OpenThree),
            (3, 1) => Some(ThreatKind::Three),
            (2, 2) => Some(ThreatKind::OpenTwo),
            _ => None,
        }
    }

    /// Sliding windows for gapped shapes: broken fours in 5-wide windows,
    /// broken threes in 4-wide windows (suppressed inside a broken four),
    /// jump threes in 5-wide windows.
    fn scan_windows(
        line: &[LineCell],
        stone: Stone,
        direction: Direction,
        threats: &mut Vec<Threat>,
    ) {
        let n = line.len();
        if n < 4 {
            return;
        }

        if n >= 5 {
            for i in 0..=n - 5 {
                let window = &line[i..i + 5];
                if let Some(indices) = Self::match_broken_four(window, stone) {
                    threats.push(Self::window_threat(
                        ThreatKind::BrokenFour,
                        window,
                        &indices,
                        stone,
                        direction,
                    ));
                }
                if let Some(indices) = Self::match_jump_three(window, stone) {
                    threats.push(Self::window_threat(
                        ThreatKind::JumpThree,
                        window,
                        &indices,
                        stone,
                        direction,
                    ));
                }
            }
        }

        for i in 0..=n - 4 {
            let window = &line[i..i + 4];
            if let Some(indices) = Self::match_broken_three(window, stone) {
                if !Self::inside_broken_four(line, i, i + 4, stone) {
                    threats.push(Self::window_threat(
                        ThreatKind::BrokenThree,
                        window,
                        &indices,
                        stone,
                        direction,
                    ));
                }
            }
        }
    }

    fn window_threat(
        kind: ThreatKind,
        window: &[LineCell],
        indices: &[usize],
        stone: Stone,
        direction: Direction,
    ) -> Threat {
        let positions = indices.iter().map(|&j| (window[j].0, window[j].1)).collect();
        Threat { kind, stone, direction, positions }
    }

    /// X_XXX, XX_XX, XXX_X in a 5-cell window.
    fn match_broken_four(window: &[LineCell], stone: Stone) -> Option<Vec<usize>> {
        let cell = |j: usize| window[j].2;
        let own = Some(stone);
        if cell(0) == own && cell(1).is_none() && cell(2) == own && cell(3) == own && cell(4) == own
        {
            return Some(vec![0, 2, 3, 4]);
        }
        if cell(0) == own && cell(1) == own && cell(2).is_none() && cell(3) == own && cell(4) == own
        {
            return Some(vec![0, 1, 3, 4]);
        }
        if cell(0) == own && cell(1) == own && cell(2) == own && cell(3).is_none() && cell(4) == own
        {
            return Some(vec![0, 1, 2, 4]);
        }
        None
    }

    /// X_XX, XX_X in a 4-cell window.
    fn match_broken_three(window: &[LineCell], stone: Stone) -> Option<Vec<usize>> {
        let cell = |j: usize| window[j].2;
        let own = Some(stone);
        if cell(0) == own && cell(1).is_none() && cell(2) == own && cell(3) == own {
            return Some(vec![0, 2, 3]);
        }
        if cell(0) == own && cell(1) == own && cell(2).is_none() && cell(3) == own {
            return Some(vec![0, 1, 3]);
        }
        None
    }

    /// X__XX, XX__X in a 5-cell window.
    fn match_jump_three(window: &[LineCell], stone: Stone) -> Option<Vec<usize>> {
        let cell = |j: usize| window[j].2;
        let own = Some(stone);
        if cell(0) == own
            && cell(1).is_none()
            && cell(2).is_none()
            && cell(3) == own
            && cell(4) == own
        {
            return Some(vec![0, 3, 4]);
        }
        if cell(0) == own
            && cell(1) == own
            && cell(2).is_none()
            && cell(3).is_none()
            && cell(4) == own
        {
            return Some(vec![0, 1, 4]);
        }
        None
    }

    /// A broken three fully contained in a broken-four window would be
    /// double-counted; check the windows one cell wider on each side.
    fn inside_broken_four(line: &[LineCell], start: usize, end: usize, stone: Stone) -> bool {
        if start > 0 && end <= line.len() {
            let window = &line[start - 1..end];
            if window.len() == 5 && Self::match_broken_four(window, stone).is_some() {
                return true;
            }
        }
        if end < line.len() {
            let window = &line[start..end + 1];
            if window.len() == 5 && Self::match_broken_four(window, stone).is_some() {
                return true;
            }
        }
        false
    }

    /// Empty cells that would enlarge or complete a threat: the two span
    /// ends plus interior gap cells for broken/jump shapes. Positions are in
    /// line order, so the first and last entries bound the span.
    pub fn extension_cells(board: &Board, threat: &Threat) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        let Some(&first) = threat.positions.first() else {
            return cells;
        };
        let &last = threat.positions.last().unwrap();
        let (dr, dc) = threat.direction.delta();

        let before = (first.0 as isize - dr, first.1 as isize - dc);
        if Board::in_bounds(before.0, before.1)
            && board.is_empty_at(before.0 as usize, before.1 as usize)
        {
            cells.push((before.0 as usize, before.1 as usize));
        }

        let after = (last.0 as isize + dr, last.1 as isize + dc);
        if Board::in_bounds(after.0, after.1)
            && board.is_empty_at(after.0 as usize, after.1 as usize)
        {
            cells.push((after.0 as usize, after.1 as usize));
        }

        if threat.kind.has_gaps() {
            for pair in threat.positions.windows(2) {
                let (mut row, mut col) = (pair[0].0 as isize + dr, pair[0].1 as isize + dc);
                while (row, col) != (pair[1].0 as isize, pair[1].1 as isize) {
                    if !Board::in_bounds(row, col) {
                        break;
                    }
                    if board.is_empty_at(row as usize, col as usize) {
                        cells.push((row as usize, col as usize));
                    }
                    row += dr;
                    col += dc;
                }
            }
        }

        cells
    }

    /// Bucket threats by extension cell; two threats in different directions
    /// meeting at one empty cell form a double threat.
    fn detect_double_threats(board: &Board, threats: &[Threat]) -> Vec<DoubleThreat> {
        let mut buckets: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
        for (idx, threat) in threats.iter().enumerate() {
            for cell in Self::extension_cells(board, threat) {
                buckets.entry(cell).or_default().push(idx);
            }
        }

        let mut doubles = Vec::new();
        let mut seen_pairs: HashSet<(usize, usize)> = HashSet::new();

        for (cell, members) in buckets {
            if members.len() < 2 {
                continue;
            }
            for a in 0..members.len() {
                for b in a + 1..members.len() {
                    let (i, j) = (members[a], members[b]);
                    let (first, second) = (&threats[i], &threats[j]);
                    if first.direction == second.direction {
                        continue;
                    }
                    if !seen_pairs.insert((i.min(j), i.max(j))) {
                        continue;
                    }
                    if let Some(kind) = Self::classify_double(first.kind, second.kind) {
                        doubles.push(DoubleThreat {
                            kind,
                            key_position: cell,
                            first: first.clone(),
                            second: second.clone(),
                            severity: kind.severity(),
                        });
                    }
                }
            }
        }

        doubles
    }

    fn classify_double(a: ThreatKind, b: ThreatKind) -> Option<DoubleThreatKind> {
        let a_four = a.is_four_type();
        let b_four = b.is_four_type();
        let a_three = a.is_three_type();
        let b_three = b.is_three_type();

        if a_four && b_four {
            Some(DoubleThreatKind::DoubleFour)
        } else if (a_four && b_three) || (a_three && b_four) {
            Some(DoubleThreatKind::FourThree)
        } else if a_three && b_three {
            Some(DoubleThreatKind::DoubleThree)
        } else {
            None
        }
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
    fn test_open_three_detected() {
        let board = board_with(&[
            (7, 6, Stone::X),
            (7, 7, Stone::X),
            (7, 8, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.count(ThreatKind::OpenThree), 1);
        assert_eq!(result.count(ThreatKind::Three), 0);
    }

    #[test]
    fn test_blocked_three_is_simple_three() {
        let board = board_with(&[
            (7, 6, Stone::X),
            (7, 7, Stone::X),
            (7, 8, Stone::X),
            (7, 9, Stone::O),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.count(ThreatKind::OpenThree), 0);
        assert_eq!(result.count(ThreatKind::Three), 1);
    }

    #[test]
    fn test_edge_counts_as_blocked() {
        let board = board_with(&[
            (0, 0, Stone::X),
            (0, 1, Stone::X),
            (0, 2, Stone::X),
            (0, 3, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.count(ThreatKind::OpenFour), 0);
        assert_eq!(result.count(ThreatKind::Four), 1);
    }

    #[test]
    fn test_broken_four_templates() {
        // X X _ X X on a row
        let board = board_with(&[
            (5, 3, Stone::X),
            (5, 4, Stone::X),
            (5, 6, Stone::X),
            (5, 7, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.count(ThreatKind::BrokenFour), 1);
    }

    #[test]
    fn test_jump_three_detected() {
        // X _ _ X X
        let board = board_with(&[
            (4, 2, Stone::X),
            (4, 5, Stone::X),
            (4, 6, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.count(ThreatKind::JumpThree), 1);
    }

    #[test]
    fn test_broken_three_suppressed_inside_broken_four() {
        // X _ X X X contains X _ X X; only the broken four may count.
        let board = board_with(&[
            (6, 2, Stone::X),
            (6, 4, Stone::X),
            (6, 5, Stone::X),
            (6, 6, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.count(ThreatKind::BrokenFour), 1);
        assert_eq!(result.count(ThreatKind::BrokenThree), 0);
    }

    #[test]
    fn test_five_detected_on_diagonal() {
        let stones: Vec<_> = (0..5).map(|i| (3 + i, 3 + i, Stone::O)).collect();
        let board = board_with(&stones);
        let result = ThreatDetector::detect(&board, Stone::O);
        assert_eq!(result.count(ThreatKind::Five), 1);
    }

    #[test]
    fn test_dedup_distinct_position_sets() {
        let board = board_with(&[
            (7, 5, Stone::X),
            (7, 6, Stone::X),
            (7, 7, Stone::X),
            (6, 7, Stone::X),
            (5, 7, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        for (i, a) in result.threats.iter().enumerate() {
            for b in result.threats.iter().skip(i + 1) {
                let mut pa = a.positions.clone();
                let mut pb = b.positions.clone();
                pa.sort_unstable();
                pb.sort_unstable();
                assert_ne!(pa, pb, "duplicate position sets in one result");
            }
        }
    }

    #[test]
    fn test_double_three_key_position() {
        // Open threes E8-G8 and H5-H7 cross at the empty cell H8 = (7, 7).
        let board = board_with(&[
            (7, 4, Stone::X),
            (7, 5, Stone::X),
            (7, 6, Stone::X),
            (4, 7, Stone::X),
            (5, 7, Stone::X),
            (6, 7, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.double_count(DoubleThreatKind::DoubleThree), 1);
        let double = &result.double_threats[0];
        assert_eq!(double.key_position, (7, 7));
        assert_ne!(double.first.direction, double.second.direction);
    }

    #[test]
    fn test_no_double_for_same_direction() {
        // Two open twos on the same row share no crossing; the shared
        // extension cell is on the same line, so no double threat.
        let board = board_with(&[
            (7, 2, Stone::X),
            (7, 3, Stone::X),
            (7, 6, Stone::X),
            (7, 7, Stone::X),
        ]);
        let result = ThreatDetector::detect(&board, Stone::X);
        assert_eq!(result.double_total(), 0);
    }

    #[test]
    fn test_empty_board_no_threats() {
        let result = ThreatDetector::detect(&Board::new(), Stone::X);
        assert!(result.threats.is_empty());
        assert_eq!(result.score, 0);
    }
}
