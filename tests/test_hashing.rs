use caro_analysis::core::board::{Board, Stone};
use caro_analysis::search::transposition::{Bound, TranspositionTable};
use caro_analysis::search::zobrist::ZobristHash;

#[test]
fn test_identical_positions_identical_hashes() {
    let zobrist = ZobristHash::new();

    // Reach the same position through two different move orders.
    let mut first = Board::new();
    first.place(7, 7, Stone::X);
    first.place(3, 3, Stone::O);
    first.place(8, 8, Stone::X);

    let mut second = Board::new();
    second.place(8, 8, Stone::X);
    second.place(3, 3, Stone::O);
    second.place(7, 7, Stone::X);

    assert_eq!(
        zobrist.compute(&first, Stone::O),
        zobrist.compute(&second, Stone::O)
    );
}

#[test]
fn test_incremental_update_matches_recompute() {
    let zobrist = ZobristHash::new();
    let mut board = Board::new();
    let mut hash = zobrist.compute(&board, Stone::X);
    let mut to_move = Stone::X;

    let game = [
        (7, 7),
        (7, 8),
        (8, 7),
        (6, 6),
        (9, 7),
        (5, 5),
        (6, 7),
        (4, 4),
    ];
    for &(row, col) in &game {
        board.place(row, col, to_move);
        hash = zobrist.toggle_side(zobrist.update(hash, row, col, to_move));
        to_move = to_move.opponent();
        assert_eq!(hash, zobrist.compute(&board, to_move));
    }

    // Undoing moves walks the same hashes back.
    for &(row, col) in game.iter().rev() {
        to_move = to_move.opponent();
        board.remove(row, col);
        hash = zobrist.toggle_side(zobrist.update(hash, row, col, to_move));
        assert_eq!(hash, zobrist.compute(&board, to_move));
    }
}

#[test]
fn test_table_returns_move_for_insufficient_depth() {
    let mut tt = TranspositionTable::new(4096);
    tt.store(0xDEAD_BEEF, 4, 123, Bound::Exact, Some((2, 3)));

    let probe = tt.probe(0xDEAD_BEEF, 8, -1_000, 1_000);
    assert_eq!(probe.score, None);
    assert_eq!(probe.best_move, Some((2, 3)));
}

#[test]
fn test_age_based_replacement() {
    let mut tt = TranspositionTable::new(4096);
    tt.new_search();
    tt.store(0xAAAA, 8, 10, Bound::Exact, None);

    // A new search may overwrite older entries even at lower depth.
    tt.new_search();
    tt.store(0xAAAA, 2, 99, Bound::Exact, Some((5, 5)));

    let probe = tt.probe(0xAAAA, 2, -1_000, 1_000);
    assert_eq!(probe.score, Some(99));
}

#[test]
fn test_upper_bound_usable_only_below_alpha() {
    let mut tt = TranspositionTable::new(4096);
    tt.store(0xBBBB, 5, -80, Bound::Upper, None);

    let probe = tt.probe(0xBBBB, 5, -50, 50);
    assert_eq!(probe.score, Some(-80), "score <= alpha should cut off");

    let probe = tt.probe(0xBBBB, 5, -200, 50);
    assert_eq!(probe.score, None, "score above alpha is unusable");
}
