use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use crate::core::board::{Board, Stone, BOARD_CELLS};
use crate::core::coords::BOARD_SIZE;

/// Fixed seed so every analyzer produces identical hashes.
const ZOBRIST_SEED: u64 = 0x5EED_CA20_15A1_7A6E;

/// Zobrist keys: one 64-bit key per (cell, stone) pair plus a side-to-move
/// key. The position hash is the XOR over occupied cells; placing or
/// removing a stone is a single XOR.
#[derive(Clone, Debug)]
pub struct ZobristHash {
    cell_keys: Vec<[u64; 2]>,
    side_key: u64,
}

impl Default for ZobristHash {
    fn default() -> Self {
        Self::new()
    }
}

impl ZobristHash {
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(ZOBRIST_SEED);
        let mut cell_keys = Vec::with_capacity(BOARD_CELLS);
        for _ in 0..BOARD_CELLS {
            cell_keys.push([rng.random::<u64>(), rng.random::<u64>()]);
        }
        let side_key = rng.random::<u64>();
        Self { cell_keys, side_key }
    }

    /// Full hash of a position with the given side to move. O is folded in
    /// through the side key so transpositions with different movers differ.
    pub fn compute(&self, board: &Board, to_move: Stone) -> u64 {
        let mut hash = 0u64;
        for (row, col, stone) in board.stones() {
            hash ^= self.cell_keys[row * BOARD_SIZE + col][stone.index()];
        }
        if to_move == Stone::O {
            hash ^= self.side_key;
        }
        hash
    }

    /// Incremental update for placing or removing one stone; XOR is its own
    /// inverse.
    #[inline]
    pub fn update(&self, hash: u64, row: usize, col: usize, stone: Stone) -> u64 {
        hash ^ self.cell_keys[row * BOARD_SIZE + col][stone.index()]
    }

    #[inline]
    pub fn toggle_side(&self, hash: u64) -> u64 {
        hash ^ self.side_key
    }
}
