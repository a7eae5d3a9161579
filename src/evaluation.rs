use crate::board::{PieceKind, PlayerColor, Square};
use crate::game::GameState;
use crate::moves::count_initial_moves;
use rand::rngs::SmallRng;
use rand::Rng;

/// Sentinel magnitude for a decided position. Search mate bookkeeping and
/// the analysis formatter both key off this value.
pub const CHECKMATE: f64 = 100_000.0;

// ==================== Piece values ====================

pub fn piece_value(kind: PieceKind) -> f64 {
    match kind {
        PieceKind::Man => 100.0,
        // The knight's charge is worth half a man in practice.
        PieceKind::Knight => 150.0,
    }
}

// ==================== Evaluation weights ====================

// Occupying an enemy castle square is most of the way to winning.
const CASTLE_OCCUPATION_BONUS: f64 = 80.0;

// Staged bonus by Manhattan distance to the nearest enemy-castle square.
const CASTLE_PROXIMITY: [(i8, f64); 4] = [(2, 40.0), (4, 26.0), (6, 13.0), (8, 6.0)];

// Files E-H funnel into both castles; D and I are one step off the funnel.
const CENTER_FILE_BONUS: f64 = 3.0;
const NEAR_CENTER_FILE_BONUS: f64 = 1.5;

// Per-rank advancement weight, measured from each side's starting zone.
const FORWARD_PROGRESS_WEIGHT: f64 = 12.0;

const MOBILITY_BONUS_PER_MOVE: f64 = 3.0;
const MOBILITY_WEIGHT: f64 = 0.5;

/// Tie-breaking noise amplitude; uniform in [-JITTER, +JITTER).
const JITTER: f64 = 10.0;

// ==================== Main evaluation ====================

/// Static score from White's perspective; callers negate for Black. Decided
/// positions return exactly +/-CHECKMATE with no jitter. The RNG is the
/// engine's: seeding it makes evaluation fully deterministic.
pub fn evaluate(state: &GameState, rng: &mut SmallRng) -> f64 {
    let white_moves = count_initial_moves(&state.board, PlayerColor::White);
    let black_moves = count_initial_moves(&state.board, PlayerColor::Black);

    if wins(state, PlayerColor::White, black_moves) {
        return CHECKMATE;
    }
    if wins(state, PlayerColor::Black, white_moves) {
        return -CHECKMATE;
    }

    let mut score = 0.0;
    for (sq, piece) in state.board.pieces() {
        let piece_score = piece_value(piece.kind)
            + castle_term(sq, piece.color)
            + center_file_term(sq)
            + forward_progress_term(sq, piece.color);
        match piece.color {
            PlayerColor::White => score += piece_score,
            PlayerColor::Black => score -= piece_score,
        }
    }

    score += MOBILITY_WEIGHT * MOBILITY_BONUS_PER_MOVE * white_moves as f64;
    score -= MOBILITY_WEIGHT * MOBILITY_BONUS_PER_MOVE * black_moves as f64;

    score + rng.gen_range(-JITTER..JITTER)
}

/// Win test shared with the terminal branch of the search: two pieces in
/// the enemy castle, everything captured, or the opponent (to move) with no
/// legal first step. A side under two pieces cannot win.
fn wins(state: &GameState, color: PlayerColor, opponent_moves: u32) -> bool {
    if state.piece_count(color) < 2 {
        return false;
    }
    let occupied = color
        .enemy_castle()
        .iter()
        .all(|sq| matches!(state.board.get_piece(*sq), Some(p) if p.color == color));
    if occupied {
        return true;
    }
    let opponent = color.opponent();
    if !state.has_pieces(opponent) {
        return true;
    }
    state.turn == opponent && opponent_moves == 0
}

// ==================== Positional terms ====================

fn castle_term(sq: Square, color: PlayerColor) -> f64 {
    let castle = color.enemy_castle();
    if castle.contains(&sq) {
        return CASTLE_OCCUPATION_BONUS + CASTLE_PROXIMITY[0].1;
    }
    let dist = castle
        .iter()
        .map(|c| sq.manhattan_distance(*c))
        .min()
        .unwrap_or(i8::MAX);
    for (limit, bonus) in CASTLE_PROXIMITY {
        if dist <= limit {
            return bonus;
        }
    }
    0.0
}

fn center_file_term(sq: Square) -> f64 {
    match sq.file {
        4..=7 => CENTER_FILE_BONUS,      // E-H
        3 | 8 => NEAR_CENTER_FILE_BONUS, // D, I
        _ => 0.0,
    }
}

fn forward_progress_term(sq: Square, color: PlayerColor) -> f64 {
    let progress = match color {
        PlayerColor::White => sq.rank - 6,
        PlayerColor::Black => 11 - sq.rank,
    };
    progress as f64 * FORWARD_PROGRESS_WEIGHT
}
