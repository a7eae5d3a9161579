use crate::board::{Board, Piece, PieceKind, PlayerColor, Square};
use crate::moves::{self, CompleteTurn};
use crate::search::zobrist;

/// How a finished game was won. The engine reports these; clocks, draws and
/// resignation live in the game layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinCondition {
    CastleOccupation,
    CaptureAll,
    Stalemate,
}

impl WinCondition {
    pub fn to_str(&self) -> &'static str {
        match self {
            WinCondition::CastleOccupation => "castle_occupation",
            WinCondition::CaptureAll => "capture_all",
            WinCondition::Stalemate => "stalemate",
        }
    }
}

/// A position plus the side to move. The castle-move counters arrive from
/// the game layer (which caps them); the engine only hashes them.
#[derive(Clone)]
pub struct GameState {
    pub board: Board,
    pub turn: PlayerColor,
    /// Times each color has moved a piece between the two squares of the
    /// opponent's castle, indexed by `PlayerColor::index()`.
    pub castle_moves: [u8; 2],
    /// Incrementally maintained Zobrist hash.
    pub hash: u64,
    pub white_piece_count: u32,
    pub black_piece_count: u32,
}

const WHITE_KNIGHTS: [Square; 4] = [
    Square::new(2, 6), // C6
    Square::new(3, 7), // D7
    Square::new(8, 7), // I7
    Square::new(9, 6), // J6
];

const WHITE_MEN: [Square; 10] = [
    Square::new(3, 6), // D6
    Square::new(4, 6), // E6
    Square::new(4, 7), // E7
    Square::new(5, 6), // F6
    Square::new(5, 7), // F7
    Square::new(6, 6), // G6
    Square::new(6, 7), // G7
    Square::new(7, 6), // H6
    Square::new(7, 7), // H7
    Square::new(8, 6), // I6
];

const BLACK_KNIGHTS: [Square; 4] = [
    Square::new(2, 11), // C11
    Square::new(3, 10), // D10
    Square::new(8, 10), // I10
    Square::new(9, 11), // J11
];

const BLACK_MEN: [Square; 10] = [
    Square::new(3, 11), // D11
    Square::new(4, 11), // E11
    Square::new(4, 10), // E10
    Square::new(5, 11), // F11
    Square::new(5, 10), // F10
    Square::new(6, 11), // G11
    Square::new(6, 10), // G10
    Square::new(7, 11), // H11
    Square::new(7, 10), // H10
    Square::new(8, 11), // I11
];

impl GameState {
    pub fn new() -> Self {
        GameState {
            board: Board::new(),
            turn: PlayerColor::White,
            castle_moves: [0, 0],
            hash: 0,
            white_piece_count: 0,
            black_piece_count: 0,
        }
    }

    /// The standard starting placement, White to move.
    pub fn initial() -> Self {
        let mut state = GameState::new();
        for sq in WHITE_KNIGHTS {
            state
                .board
                .set_piece(sq, Piece::new(PieceKind::Knight, PlayerColor::White));
        }
        for sq in WHITE_MEN {
            state
                .board
                .set_piece(sq, Piece::new(PieceKind::Man, PlayerColor::White));
        }
        for sq in BLACK_KNIGHTS {
            state
                .board
                .set_piece(sq, Piece::new(PieceKind::Knight, PlayerColor::Black));
        }
        for sq in BLACK_MEN {
            state
                .board
                .set_piece(sq, Piece::new(PieceKind::Man, PlayerColor::Black));
        }
        state.recompute_piece_counts();
        state.recompute_hash();
        state
    }

    /// Rebuild the per-color piece counts from the board.
    pub fn recompute_piece_counts(&mut self) {
        self.white_piece_count = self.board.count_pieces(PlayerColor::White);
        self.black_piece_count = self.board.count_pieces(PlayerColor::Black);
    }

    #[inline]
    pub fn piece_count(&self, color: PlayerColor) -> u32 {
        match color {
            PlayerColor::White => self.white_piece_count,
            PlayerColor::Black => self.black_piece_count,
        }
    }

    #[inline]
    pub fn has_pieces(&self, color: PlayerColor) -> bool {
        self.piece_count(color) > 0
    }

    /// Return the incrementally maintained hash (fast).
    #[inline]
    pub fn generate_hash(&self) -> u64 {
        self.hash
    }

    /// Recompute the hash from scratch (slow, use sparingly).
    pub fn recompute_hash(&mut self) {
        self.hash = zobrist::hash_state(self);
    }

    /// The position after playing a complete turn: piece placement from the
    /// turn, side to move flipped, castle counters carried over, hash
    /// updated incrementally from the piece differences.
    pub fn after_turn(&self, turn: &CompleteTurn) -> GameState {
        let origin = turn.origin();
        let terminal = turn.terminal();

        let mut hash = self.hash ^ zobrist::side_key();
        let mut white_loss = 0u32;
        let mut black_loss = 0u32;

        if let Some(piece) = self.board.get_piece(origin) {
            hash ^= zobrist::piece_key(piece, origin);
            hash ^= zobrist::piece_key(piece, terminal);
        }
        for sq in &turn.captured {
            if let Some(piece) = self.board.get_piece(*sq) {
                hash ^= zobrist::piece_key(piece, *sq);
                match piece.color {
                    PlayerColor::White => white_loss += 1,
                    PlayerColor::Black => black_loss += 1,
                }
            }
        }

        GameState {
            board: turn.board.clone(),
            turn: self.turn.opponent(),
            castle_moves: self.castle_moves,
            hash,
            white_piece_count: self.white_piece_count - white_loss,
            black_piece_count: self.black_piece_count - black_loss,
        }
    }

    /// Has `color` already won this position? Castle occupation and
    /// capture-all are static; stalemate only applies when the opponent is
    /// the side to move and has no legal turn. A side below two pieces can
    /// no longer occupy a castle and so cannot claim a win.
    pub fn check_win_condition(&self, color: PlayerColor) -> Option<WinCondition> {
        if self.piece_count(color) < 2 {
            return None;
        }

        let occupied = color
            .enemy_castle()
            .iter()
            .all(|sq| matches!(self.board.get_piece(*sq), Some(p) if p.color == color));
        if occupied {
            return Some(WinCondition::CastleOccupation);
        }

        let opponent = color.opponent();
        if !self.has_pieces(opponent) {
            return Some(WinCondition::CaptureAll);
        }

        if self.turn == opponent && moves::generate_turns(self).is_empty() {
            return Some(WinCondition::Stalemate);
        }

        None
    }

    /// Count complete-turn sequences to the given depth. Debugging aid for
    /// the generator; not used by the search.
    pub fn perft(&self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        let turns = moves::generate_turns(self);
        if depth == 1 {
            return turns.len() as u64;
        }
        turns
            .iter()
            .map(|t| self.after_turn(t).perft(depth - 1))
            .sum()
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}
