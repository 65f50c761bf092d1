use std::time::Duration;

use caro_analysis::core::board::{Board, Stone};
use caro_analysis::eval::cache::EvalCache;
use caro_analysis::search::minimax::MinimaxSearcher;

fn board_with(stones: &[(usize, usize, Stone)]) -> Board {
    let mut board = Board::new();
    for &(row, col, stone) in stones {
        board.place(row, col, stone);
    }
    board
}

#[test]
fn test_tt_and_no_tt_agree_on_best_move() {
    // A quiet midgame position with one clearly strongest continuation.
    let stones = [
        (7, 6, Stone::X),
        (7, 7, Stone::X),
        (7, 8, Stone::O),
        (5, 5, Stone::O),
    ];

    let mut board = board_with(&stones);
    let cache = EvalCache::default();
    let mut with_tt = MinimaxSearcher::new(1 << 16);
    let tt_outcome = with_tt.best_moves(&mut board, Stone::X, 3, 3, None, &cache);

    let mut board = board_with(&stones);
    let cache = EvalCache::default();
    let mut without_tt = MinimaxSearcher::new(1 << 16);
    without_tt.set_tt_enabled(false);
    let plain_outcome = without_tt.best_moves(&mut board, Stone::X, 3, 3, None, &cache);

    assert_eq!(
        tt_outcome.moves.first().map(|m| m.score),
        plain_outcome.moves.first().map(|m| m.score),
        "TT must not change the best score"
    );
    assert_eq!(
        tt_outcome.moves.first().map(|m| (m.row, m.col)),
        plain_outcome.moves.first().map(|m| (m.row, m.col)),
        "TT must not change the best move"
    );
}

#[test]
fn test_time_budget_returns_completed_depth() {
    let mut board = board_with(&[
        (7, 7, Stone::X),
        (7, 8, Stone::O),
        (8, 7, Stone::X),
        (6, 6, Stone::O),
        (8, 8, Stone::X),
        (5, 5, Stone::O),
    ]);
    let cache = EvalCache::default();
    let mut searcher = MinimaxSearcher::new(1 << 16);

    // A zero budget cannot complete any depth; the search must still give
    // back a best-effort answer without panicking.
    let outcome =
        searcher.best_moves(&mut board, Stone::X, 9, 3, Some(Duration::ZERO), &cache);
    assert!(outcome.budget_exhausted || outcome.depth_reached > 0);
}

#[test]
fn test_deeper_search_never_returns_partial_depths() {
    let mut board = board_with(&[(7, 7, Stone::X), (7, 8, Stone::O)]);
    let cache = EvalCache::default();
    let mut searcher = MinimaxSearcher::new(1 << 16);

    let outcome = searcher.best_moves(&mut board, Stone::X, 3, 3, None, &cache);
    // Iterative deepening runs odd depths: 1, 3, ...
    assert!(outcome.depth_reached == 3 || outcome.depth_reached == 1);
    assert!(!outcome.moves.is_empty());
}

#[test]
fn test_blocks_double_threat_key_cell() {
    // O is about to land a double three at the crossing; X to move must
    // answer inside the fork.
    let mut board = board_with(&[
        (7, 4, Stone::O),
        (7, 5, Stone::O),
        (7, 6, Stone::O),
        (4, 7, Stone::O),
        (5, 7, Stone::O),
        (6, 7, Stone::O),
        (3, 3, Stone::X),
        (3, 4, Stone::X),
        (3, 5, Stone::X),
    ]);
    let cache = EvalCache::default();
    let mut searcher = MinimaxSearcher::new(1 << 16);
    let outcome = searcher.best_moves(&mut board, Stone::X, 1, 3, None, &cache);

    // Whatever is picked must be a forced answer from the preflight, not a
    // quiet developing move.
    assert!(!outcome.moves.is_empty());
    assert_eq!(outcome.depth_reached, 0, "preflight should decide a forced position");
}
