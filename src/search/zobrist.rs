//! Zobrist keys for position fingerprinting.
//!
//! One 64-bit key per (square, kind, color) triple, a side-to-move key, and
//! a short table per castle-move counter value. The tables are filled once
//! from a fixed-seed RNG, so hashes are reproducible across runs; engine
//! instances never exchange hashes, so sharing the tables is safe.

use crate::board::{PlayerColor, Piece, Square, GRID_CELLS};
use crate::game::GameState;
use once_cell::sync::Lazy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const KEY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Castle-move counters are capped at 2 by the rules layer.
const MAX_CASTLE_MOVES: usize = 2;

struct Keys {
    /// Indexed [color][kind][cell].
    pieces: [[[u64; GRID_CELLS]; 2]; 2],
    side: u64,
    /// Indexed [color][counter value]; value 0 is never XOR'd in.
    castle: [[u64; MAX_CASTLE_MOVES + 1]; 2],
}

static KEYS: Lazy<Keys> = Lazy::new(|| {
    let mut rng = SmallRng::seed_from_u64(KEY_SEED);
    let mut keys = Keys {
        pieces: [[[0; GRID_CELLS]; 2]; 2],
        side: 0,
        castle: [[0; MAX_CASTLE_MOVES + 1]; 2],
    };
    for color in 0..2 {
        for kind in 0..2 {
            for cell in 0..GRID_CELLS {
                keys.pieces[color][kind][cell] = rng.gen();
            }
        }
    }
    keys.side = rng.gen();
    for color in 0..2 {
        for count in 0..=MAX_CASTLE_MOVES {
            keys.castle[color][count] = rng.gen();
        }
    }
    keys
});

#[inline]
pub fn piece_key(piece: Piece, sq: Square) -> u64 {
    KEYS.pieces[piece.color.index()][piece.kind.index()][sq.index()]
}

/// XOR'd in iff Black is to move.
#[inline]
pub fn side_key() -> u64 {
    KEYS.side
}

#[inline]
pub fn castle_key(color: PlayerColor, count: u8) -> u64 {
    KEYS.castle[color.index()][(count as usize).min(MAX_CASTLE_MOVES)]
}

/// Full recomputation from a position. `GameState` keeps its hash current
/// incrementally; this is the ground truth it is checked against.
pub fn hash_state(state: &GameState) -> u64 {
    let mut hash = 0u64;
    for (sq, piece) in state.board.pieces() {
        hash ^= piece_key(piece, sq);
    }
    if state.turn == PlayerColor::Black {
        hash ^= side_key();
    }
    for color in [PlayerColor::White, PlayerColor::Black] {
        let count = state.castle_moves[color.index()];
        if count > 0 {
            hash ^= castle_key(color, count);
        }
    }
    hash
}
