use caro_analysis::analysis::analyzer::{AnalyzerConfig, GameAnalyzer};
use caro_analysis::analysis::types::{
    AnalysisError, GamePatternKind, Mistake, MistakeSeverity, Move, MoveClassification,
    MoveReason, PatternSeverity, SequenceViolation,
};
use caro_analysis::core::board::{Board, Stone};
use caro_analysis::core::coords::parse_notation;
use caro_analysis::threats::types::DoubleThreatKind;

fn mv(notation: &str, stone: Stone) -> Move {
    Move::from_notation(notation, stone).unwrap()
}

/// Alternating game from notations, X first.
fn game(notations: &[&str]) -> Vec<Move> {
    notations
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let stone = if i % 2 == 0 { Stone::X } else { Stone::O };
            mv(n, stone)
        })
        .collect()
}

#[test]
fn test_immediate_win_detection() {
    // X holds an open four H8-H11; either end completes five.
    let mut board = Board::new();
    for notation in ["H8", "H9", "H10", "H11"] {
        let (row, col) = parse_notation(notation).unwrap();
        board.place(row, col, Stone::X);
    }
    for notation in ["A1", "A3", "A5"] {
        let (row, col) = parse_notation(notation).unwrap();
        board.place(row, col, Stone::O);
    }

    let mut analyzer = GameAnalyzer::default();
    let best = analyzer
        .find_best_move(&board, Stone::X)
        .unwrap()
        .expect("a best move exists");

    assert!(best.notation == "H7" || best.notation == "H12", "got {}", best.notation);
    assert_eq!(best.reason, MoveReason::Wins);
}

#[test]
fn test_winning_move_is_excellent_and_clean() {
    // X walks into the open four and completes it; the final move must be
    // classified at least good with no mistake recorded.
    let moves = game(&["H8", "A1", "H9", "A3", "H10", "A5", "H11", "A7", "H7"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    let last = result.timeline.last().unwrap();
    assert_eq!(last.notation, "H7");
    assert!(last.classification <= MoveClassification::Good);
    assert!(result.mistakes.iter().all(|m: &Mistake| m.move_number != 9));
    assert_eq!(result.summary.winner, Some(Stone::X));
}

#[test]
fn test_missed_win_mistake_and_pattern() {
    // X has an open four after move 7; move 9 wanders to the corner.
    let moves = game(&["H8", "A1", "H9", "A3", "H10", "A5", "H11", "A7", "O15", "A9"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    let mistake = result
        .mistakes
        .iter()
        .find(|m| m.move_number == 9)
        .expect("the wandering move must be a mistake");
    assert_eq!(mistake.severity, MistakeSeverity::Critical);

    assert!(result
        .patterns
        .iter()
        .any(|p| p.kind == GamePatternKind::MissedWin && p.moves.contains(&10)));
}

#[test]
fn test_late_block_pattern() {
    // O finishes an open four on move 8; X ignores it on move 9.
    let moves = game(&["A1", "H8", "A3", "H9", "A5", "H10", "A7", "H11", "C13"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    let pattern = result
        .patterns
        .iter()
        .find(|p| p.kind == GamePatternKind::LateBlock)
        .expect("late block must be reported");
    assert_eq!(pattern.moves, vec![9]);
    assert_eq!(pattern.severity, PatternSeverity::Major);
}

#[test]
fn test_double_three_key_position() {
    // Open threes E8-G8 and H5-H7 cross at the empty H8.
    let mut board = Board::new();
    for notation in ["E8", "F8", "G8", "H5", "H6", "H7"] {
        let (row, col) = parse_notation(notation).unwrap();
        board.place(row, col, Stone::X);
    }
    for notation in ["A1", "A2", "B1", "B2", "C1", "C2"] {
        let (row, col) = parse_notation(notation).unwrap();
        board.place(row, col, Stone::O);
    }

    let analyzer = GameAnalyzer::default();
    let threats = analyzer.classify_position(&board, Stone::X).unwrap();

    let doubles: Vec<_> = threats
        .double_threats
        .iter()
        .filter(|d| d.kind == DoubleThreatKind::DoubleThree)
        .collect();
    assert_eq!(doubles.len(), 1);
    assert_eq!(doubles[0].key_position, parse_notation("H8").unwrap());
}

#[test]
fn test_deterministic_replay() {
    let moves = game(&["H8", "I9", "H9", "I8", "H10", "G7", "J8", "H11", "G8"]);
    let mut analyzer = GameAnalyzer::default();
    let mut first = analyzer.analyze_game(&moves, None).unwrap();
    let mut second = analyzer.analyze_game(&moves, None).unwrap();

    first.duration_ms = 0;
    second.duration_ms = 0;
    assert_eq!(first, second);
}

#[test]
fn test_open_four_block_is_never_a_mistake() {
    // O builds an open four; X blocks one end on move 9.
    let moves = game(&["A1", "H8", "A3", "H9", "A5", "H10", "A7", "H11", "H12"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    assert!(result.mistakes.iter().all(|m| m.move_number != 9));
}

#[test]
fn test_quiet_opening_never_blunder() {
    let moves = game(&["H8", "I9", "G7", "J10", "F8", "I7", "H6", "K9"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    for entry in &result.timeline {
        assert_ne!(
            entry.classification,
            MoveClassification::Blunder,
            "move {} misclassified in a quiet opening",
            entry.move_number
        );
    }
}

#[test]
fn test_invalid_sequences_rejected() {
    let mut analyzer = GameAnalyzer::default();

    // Occupied cell.
    let moves = vec![mv("H8", Stone::X), mv("H8", Stone::O)];
    match analyzer.analyze_game(&moves, None) {
        Err(AnalysisError::InvalidMoveSequence { ordinal, violation }) => {
            assert_eq!(ordinal, 2);
            assert_eq!(violation, SequenceViolation::OccupiedCell);
        }
        other => panic!("expected occupied-cell rejection, got {other:?}"),
    }

    // Broken alternation.
    let moves = vec![mv("H8", Stone::X), mv("H9", Stone::X)];
    match analyzer.analyze_game(&moves, None) {
        Err(AnalysisError::InvalidMoveSequence { ordinal, violation }) => {
            assert_eq!(ordinal, 2);
            assert_eq!(violation, SequenceViolation::WrongTurnOrder);
        }
        other => panic!("expected turn-order rejection, got {other:?}"),
    }

    // Off-board coordinates.
    let moves = vec![Move::new(20, 20, Stone::X)];
    assert!(matches!(
        analyzer.analyze_game(&moves, None),
        Err(AnalysisError::InvalidMoveSequence {
            ordinal: 1,
            violation: SequenceViolation::OutOfBounds,
        })
    ));
}

#[test]
fn test_tempo_forcing_and_switches_match() {
    let moves = game(&["H8", "I9", "H9", "I8", "H10", "G7", "H11", "H12", "J8"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    // Move 7 (H11) completes an open four: forcing by definition.
    let entry = &result.timeline[6];
    assert!(entry.tempo.is_forcing);

    // Switch flags line up exactly with initiative changes.
    let mut holder = caro_analysis::analysis::types::Initiative::Neutral;
    for entry in &result.timeline {
        let changed = entry.tempo.initiative != holder
            && entry.tempo.initiative != caro_analysis::analysis::types::Initiative::Neutral;
        assert_eq!(entry.tempo.is_switch, changed, "move {}", entry.move_number);
        holder = entry.tempo.initiative;
    }
}

#[test]
fn test_fast_and_deep_agree_on_forced_blunders() {
    // Position with an immediate five available that X ignores.
    let moves = game(&["H8", "A1", "H9", "A3", "H10", "A5", "H11", "A7", "O15", "A9"]);

    let mut fast = GameAnalyzer::new(AnalyzerConfig::fast());
    let fast_result = fast.analyze_game(&moves, None).unwrap();

    let mut deep_config = AnalyzerConfig::deep();
    deep_config.time_budget = Some(std::time::Duration::from_millis(250));
    let mut deep = GameAnalyzer::new(deep_config);
    let deep_result = deep.analyze_game(&moves, None).unwrap();

    let blunders = |result: &caro_analysis::analysis::types::AnalysisResult| {
        result
            .timeline
            .iter()
            .filter(|e| e.classification == MoveClassification::Blunder)
            .map(|e| e.move_number)
            .collect::<Vec<_>>()
    };
    assert_eq!(blunders(&fast_result), blunders(&deep_result));
}

#[test]
fn test_opening_identified_in_patterns() {
    let moves = game(&["H8", "H9", "H7", "G8", "F7"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    assert!(result
        .patterns
        .iter()
        .any(|p| matches!(&p.kind, GamePatternKind::Opening { name } if name == "Kagetsu")));
}

#[test]
fn test_batch_analysis_matches_single() {
    let games = vec![
        game(&["H8", "I9", "H9", "I8", "H10"]),
        game(&["H8", "H9", "G7", "I9", "F6"]),
    ];
    let config = AnalyzerConfig::fast();

    let batch = GameAnalyzer::analyze_games(&config, &games, None);
    assert_eq!(batch.len(), 2);

    for (moves, outcome) in games.iter().zip(&batch) {
        let mut single = GameAnalyzer::new(config.clone());
        let mut expected = single.analyze_game(moves, None).unwrap();
        let mut got = outcome.clone().unwrap();
        expected.duration_ms = 0;
        got.duration_ms = 0;
        assert_eq!(expected, got);
    }
}

#[test]
fn test_winning_sequence_lookup() {
    let mut board = Board::new();
    for notation in ["H8", "H9", "H10"] {
        let (row, col) = parse_notation(notation).unwrap();
        board.place(row, col, Stone::X);
    }
    for notation in ["H11", "G9"] {
        let (row, col) = parse_notation(notation).unwrap();
        board.place(row, col, Stone::O);
    }

    let mut analyzer = GameAnalyzer::default();
    let line = analyzer
        .find_winning_sequence(&board, Stone::X)
        .unwrap()
        .expect("forced line exists");
    assert!(line.is_vcf);
    assert!(!line.moves.is_empty());
}

#[test]
fn test_timeline_shape() {
    let moves = game(&["H8", "I9", "H9", "I8", "H10"]);
    let mut analyzer = GameAnalyzer::default();
    let result = analyzer.analyze_game(&moves, None).unwrap();

    assert_eq!(result.timeline.len(), moves.len());
    for (i, entry) in result.timeline.iter().enumerate() {
        assert_eq!(entry.move_number, i + 1);
        assert!((0.05..=0.95).contains(&entry.win_probability));
        assert!(entry.alternatives.len() <= 3);
    }
    assert_eq!(
        result.summary.x_stats.total_moves + result.summary.o_stats.total_moves,
        moves.len()
    );
}
