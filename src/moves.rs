use crate::board::{Board, Piece, PlayerColor, Square, DIRECTIONS};
use crate::game::GameState;
use std::collections::HashSet;
use thiserror::Error;

/// Hard cap on steps within one turn. Chained jumps on a 160-square board
/// stay far below this in practice; reaching the cap emits the turn as-is.
const MAX_TURN_STEPS: usize = 15;

// ==================== Step predicates ====================

/// A plain move: one king-step onto an empty square.
#[inline]
pub fn is_plain_move_valid(board: &Board, from: Square, to: Square) -> bool {
    from.is_one_step(to) && board.is_empty_square(to)
}

/// A canter: leap two squares along one direction over an adjacent friendly
/// piece onto an empty square. The friendly piece stays.
#[inline]
pub fn is_canter_valid(board: &Board, from: Square, to: Square, side: PlayerColor) -> bool {
    from.is_two_step(to)
        && board.is_empty_square(to)
        && matches!(board.get_piece(from.midpoint(to)), Some(p) if p.color == side)
}

/// A jump: same geometry as a canter but over an enemy piece, which is
/// captured. Removal of the jumped piece is applied by the caller.
#[inline]
pub fn is_jump_valid(board: &Board, from: Square, to: Square, side: PlayerColor) -> bool {
    from.is_two_step(to)
        && board.is_empty_square(to)
        && matches!(board.get_piece(from.midpoint(to)), Some(p) if p.color != side)
}

/// Can this piece start a jump right now?
fn piece_has_jump(board: &Board, from: Square, side: PlayerColor) -> bool {
    DIRECTIONS.iter().any(|(df, dr)| {
        from.offset(df * 2, dr * 2)
            .map_or(false, |to| is_jump_valid(board, from, to, side))
    })
}

/// True iff at least one single-step jump is legal anywhere for `side`.
/// Jumps are mandatory, so this decides which turn starts are legal at all.
pub fn any_jump_available(board: &Board, side: PlayerColor) -> bool {
    board
        .pieces()
        .filter(|(_, p)| p.color == side)
        .any(|(sq, _)| piece_has_jump(board, sq, side))
}

/// Number of legal first steps for `side`, honoring the mandatory-jump rule
/// (only jumps count while any jump is available). Zero means the side has
/// no legal turn.
pub fn count_initial_moves(board: &Board, side: PlayerColor) -> u32 {
    let jumps_only = any_jump_available(board, side);
    let mut count = 0u32;

    for (from, piece) in board.pieces() {
        if piece.color != side {
            continue;
        }
        for (df, dr) in DIRECTIONS {
            if jumps_only {
                if let Some(to) = from.offset(df * 2, dr * 2) {
                    if is_jump_valid(board, from, to, side) {
                        count += 1;
                    }
                }
            } else {
                if let Some(to) = from.offset(df, dr) {
                    if is_plain_move_valid(board, from, to) {
                        count += 1;
                    }
                }
                if let Some(to) = from.offset(df * 2, dr * 2) {
                    if is_canter_valid(board, from, to, side)
                        && !side.own_castle().contains(&to)
                    {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

// ==================== Complete turns ====================

/// One full turn by one side: the visited path (origin first), the squares
/// cleared by captures along the way, and the resulting piece placement.
#[derive(Clone, Debug)]
pub struct CompleteTurn {
    pub path: Vec<Square>,
    pub captured: Vec<Square>,
    pub board: Board,
}

impl CompleteTurn {
    #[inline]
    pub fn origin(&self) -> Square {
        self.path[0]
    }

    #[inline]
    pub fn terminal(&self) -> Square {
        self.path[self.path.len() - 1]
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Path squares joined step by step, `x` where the step captured and
    /// `-` where it did not: `E6-C8-A8`, `H4xJ4xL6`, `F6-F8-H8xH10xJ12`.
    pub fn notation(&self) -> String {
        let mut out = self.path[0].to_string();
        for i in 1..self.path.len() {
            let prev = self.path[i - 1];
            let sq = self.path[i];
            let jumped = prev.is_two_step(sq) && self.captured.contains(&prev.midpoint(sq));
            out.push(if jumped { 'x' } else { '-' });
            out.push_str(&sq.to_string());
        }
        out
    }

    /// Rank gain towards the side's advancing direction, terminal vs origin.
    #[inline]
    pub fn forward_progress(&self, side: PlayerColor) -> i32 {
        ((self.terminal().rank - self.origin().rank) * side.forward()) as i32
    }
}

// ==================== Turn generator ====================

/// Depth-first exploration of every complete turn from one origin square.
/// The scratch board carries the moving piece along the path and has jumped
/// pieces removed, so step predicates see the mid-turn position.
struct TurnSearch {
    side: PlayerColor,
    is_knight: bool,
    origin: Square,
    board: Board,
    path: Vec<Square>,
    captured: Vec<Square>,
    /// Quiescence mode: suppress capture-free turns.
    captures_only: bool,
    out: Vec<CompleteTurn>,
    seen: HashSet<String>,
}

impl TurnSearch {
    #[inline]
    fn current(&self) -> Square {
        self.path[self.path.len() - 1]
    }

    /// A step may land on a previously visited square only if it is the
    /// origin (which the moving piece vacated).
    #[inline]
    fn revisits(&self, to: Square) -> bool {
        to != self.origin && self.path.contains(&to)
    }

    #[inline]
    fn in_enemy_castle(&self, sq: Square) -> bool {
        self.side.enemy_castle().contains(&sq)
    }

    /// Record the current path as a finished turn. The origin can never be
    /// the terminal square; branches that end there emit nothing.
    fn emit(&mut self) {
        if self.current() == self.origin {
            return;
        }
        if self.captures_only && self.captured.is_empty() {
            return;
        }
        let turn = CompleteTurn {
            path: self.path.clone(),
            captured: self.captured.clone(),
            board: self.board.clone(),
        };
        if self.seen.insert(turn.notation()) {
            self.out.push(turn);
        }
    }

    fn jump_targets(&self, from: Square) -> Vec<Square> {
        DIRECTIONS
            .iter()
            .filter_map(|(df, dr)| from.offset(df * 2, dr * 2))
            .filter(|to| is_jump_valid(&self.board, from, *to, self.side) && !self.revisits(*to))
            .collect()
    }

    fn canter_targets(&self, from: Square) -> Vec<Square> {
        let own_castle = self.side.own_castle();
        DIRECTIONS
            .iter()
            .filter_map(|(df, dr)| from.offset(df * 2, dr * 2))
            .filter(|to| {
                is_canter_valid(&self.board, from, *to, self.side)
                    && *to != self.origin
                    && !self.path.contains(to)
                    && !own_castle.contains(to)
            })
            .collect()
    }

    fn do_jump(&mut self, from: Square, to: Square) {
        let mid = from.midpoint(to);
        let victim = self.board.remove_piece(mid);
        let mover = self.board.remove_piece(from);
        if let Some(p) = mover {
            self.board.set_piece(to, p);
        }
        self.path.push(to);
        self.captured.push(mid);

        self.after_jump(to);

        self.path.pop();
        self.captured.pop();
        if let Some(p) = self.board.remove_piece(to) {
            self.board.set_piece(from, p);
        }
        if let Some(v) = victim {
            self.board.set_piece(mid, v);
        }
    }

    fn do_canter(&mut self, from: Square, to: Square) {
        let mover = self.board.remove_piece(from);
        if let Some(p) = mover {
            self.board.set_piece(to, p);
        }
        self.path.push(to);

        self.after_canter(to);

        self.path.pop();
        if let Some(p) = self.board.remove_piece(to) {
            self.board.set_piece(from, p);
        }
    }

    /// After a capture the turn must keep jumping while a jump exists.
    /// Landing in the opponent's castle ends the turn unconditionally.
    fn after_jump(&mut self, current: Square) {
        if self.in_enemy_castle(current) || self.path.len() >= MAX_TURN_STEPS {
            self.emit();
            return;
        }
        let targets = self.jump_targets(current);
        if targets.is_empty() {
            self.emit();
            return;
        }
        for to in targets {
            self.do_jump(current, to);
        }
    }

    /// Before any capture the piece may stop, canter on, or (knights only)
    /// begin the jumping half of a charge.
    fn after_canter(&mut self, current: Square) {
        self.emit();
        if self.in_enemy_castle(current) || self.path.len() >= MAX_TURN_STEPS {
            return;
        }
        for to in self.canter_targets(current) {
            self.do_canter(current, to);
        }
        if self.is_knight {
            for to in self.jump_targets(current) {
                self.do_jump(current, to);
            }
        }
    }

    fn start_from(&mut self, from: Square, jumps_mandatory: bool) {
        if jumps_mandatory {
            for to in self.jump_targets(from) {
                self.do_jump(from, to);
            }
            return;
        }

        // Plain moves complete the turn in a single step.
        if !self.captures_only {
            for (df, dr) in DIRECTIONS {
                if let Some(to) = from.offset(df, dr) {
                    if is_plain_move_valid(&self.board, from, to) {
                        let mover = self.board.remove_piece(from);
                        if let Some(p) = mover {
                            self.board.set_piece(to, p);
                        }
                        self.path.push(to);
                        self.emit();
                        self.path.pop();
                        if let Some(p) = self.board.remove_piece(to) {
                            self.board.set_piece(from, p);
                        }
                    }
                }
            }
        }

        for to in self.canter_targets(from) {
            self.do_canter(from, to);
        }
    }
}

/// Enumerate every distinct legal complete turn for the side to move.
/// While any jump is available the first step of every turn must be a jump;
/// otherwise turns open with a plain move or a canter chain.
pub fn generate_turns(state: &GameState) -> Vec<CompleteTurn> {
    run_generator(state, false)
}

/// Turns that capture at least one piece, for the quiescence search. With a
/// jump on the board this equals `generate_turns`; without one only knight
/// charges can capture, so the walk skips men and capture-free forks.
pub fn generate_capture_turns(state: &GameState) -> Vec<CompleteTurn> {
    run_generator(state, true)
}

fn run_generator(state: &GameState, captures_only: bool) -> Vec<CompleteTurn> {
    let side = state.turn;
    let jumps_mandatory = any_jump_available(&state.board, side);

    let mut search = TurnSearch {
        side,
        is_knight: false,
        origin: state.turn.own_castle()[0],
        board: state.board.clone(),
        path: Vec::with_capacity(MAX_TURN_STEPS),
        captured: Vec::with_capacity(MAX_TURN_STEPS),
        captures_only,
        out: Vec::new(),
        seen: HashSet::new(),
    };

    let origins: Vec<(Square, Piece)> = state
        .board
        .pieces()
        .filter(|(_, p)| p.color == side)
        .collect();

    for (from, piece) in origins {
        if captures_only && !jumps_mandatory && !piece.is_knight() {
            // Without an immediate jump only a knight's charge captures.
            continue;
        }
        search.origin = from;
        search.is_knight = piece.is_knight();
        search.path.clear();
        search.path.push(from);
        search.captured.clear();
        search.start_from(from, jumps_mandatory);
    }

    search.out
}

// ==================== Step-by-step turn construction ====================

/// Why a proposed step (or a premature finish) was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    #[error("Invalid move")]
    InvalidMove,
    #[error("Must continue jumping")]
    MustContinueJumping,
    #[error("Only knights can jump after cantering")]
    KnightRequiredForCharge,
    #[error("Can only make a plain move on the first step")]
    PlainMoveAfterFirstStep,
}

/// Incremental turn construction for interactive callers: one square per
/// `step`, with the same legality rules the generator enforces. Rejected
/// steps leave the builder untouched.
pub struct TurnBuilder {
    side: PlayerColor,
    piece: Piece,
    board: Board,
    path: Vec<Square>,
    captured: Vec<Square>,
    jumps_mandatory: bool,
    made_plain: bool,
    has_cantered: bool,
    has_captured: bool,
}

impl TurnBuilder {
    /// Start a turn with the piece on `from`, which must belong to the side
    /// to move.
    pub fn begin(state: &GameState, from: Square) -> Result<Self, StepError> {
        let piece = match state.board.get_piece(from) {
            Some(p) if p.color == state.turn => p,
            _ => return Err(StepError::InvalidMove),
        };
        Ok(TurnBuilder {
            side: state.turn,
            piece,
            board: state.board.clone(),
            path: vec![from],
            captured: Vec::new(),
            jumps_mandatory: any_jump_available(&state.board, state.turn),
            made_plain: false,
            has_cantered: false,
            has_captured: false,
        })
    }

    #[inline]
    fn origin(&self) -> Square {
        self.path[0]
    }

    #[inline]
    fn current(&self) -> Square {
        self.path[self.path.len() - 1]
    }

    /// The turn already ended: after a plain move, or on entering the
    /// opponent's castle.
    fn is_final(&self) -> bool {
        self.made_plain
            || (self.path.len() > 1 && self.side.enemy_castle().contains(&self.current()))
    }

    /// True iff the last step obliges another jump in this same turn.
    pub fn must_continue(&self) -> bool {
        self.has_captured && !self.is_final() && piece_has_jump_excluding(
            &self.board,
            self.current(),
            self.side,
            self.origin(),
            &self.path,
        )
    }

    /// Attempt one more step to `to`.
    pub fn step(&mut self, to: Square) -> Result<(), StepError> {
        if self.is_final() {
            return Err(StepError::InvalidMove);
        }
        let from = self.current();

        if from.is_one_step(to) {
            if self.path.len() > 1 {
                return Err(StepError::PlainMoveAfterFirstStep);
            }
            if self.jumps_mandatory || !is_plain_move_valid(&self.board, from, to) {
                return Err(StepError::InvalidMove);
            }
            self.move_piece(from, to);
            self.made_plain = true;
            return Ok(());
        }

        if !from.is_two_step(to) {
            return Err(StepError::InvalidMove);
        }

        let mid = from.midpoint(to);
        match self.board.get_piece(mid) {
            Some(p) if p.color == self.side => {
                // Canter.
                if self.has_captured {
                    return Err(StepError::MustContinueJumping);
                }
                if self.jumps_mandatory
                    || !self.board.is_empty_square(to)
                    || to == self.origin()
                    || self.path.contains(&to)
                    || self.side.own_castle().contains(&to)
                {
                    return Err(StepError::InvalidMove);
                }
                self.move_piece(from, to);
                self.has_cantered = true;
                Ok(())
            }
            Some(_) => {
                // Jump.
                if self.has_cantered && !self.piece.is_knight() {
                    return Err(StepError::KnightRequiredForCharge);
                }
                if !self.board.is_empty_square(to)
                    || (to != self.origin() && self.path.contains(&to))
                {
                    return Err(StepError::InvalidMove);
                }
                self.board.remove_piece(mid);
                self.move_piece(from, to);
                self.captured.push(mid);
                self.has_captured = true;
                Ok(())
            }
            None => Err(StepError::InvalidMove),
        }
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        if let Some(p) = self.board.remove_piece(from) {
            self.board.set_piece(to, p);
        }
        self.path.push(to);
    }

    /// Close the turn. Fails while a jump continuation is still mandatory,
    /// before any step was taken, or when the path would end on its origin.
    pub fn finish(self) -> Result<CompleteTurn, StepError> {
        if self.path.len() < 2 || self.current() == self.origin() {
            return Err(StepError::InvalidMove);
        }
        if self.must_continue() {
            return Err(StepError::MustContinueJumping);
        }
        Ok(CompleteTurn {
            path: self.path,
            captured: self.captured,
            board: self.board,
        })
    }
}

/// Jump availability from `from`, skipping landings that would revisit a
/// path square (the vacated origin stays legal).
fn piece_has_jump_excluding(
    board: &Board,
    from: Square,
    side: PlayerColor,
    origin: Square,
    path: &[Square],
) -> bool {
    DIRECTIONS.iter().any(|(df, dr)| {
        from.offset(df * 2, dr * 2).map_or(false, |to| {
            is_jump_valid(board, from, to, side) && (to == origin || !path.contains(&to))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceKind;

    fn put(state: &mut GameState, sq: &str, kind: PieceKind, color: PlayerColor) {
        let sq = Square::from_notation(sq).unwrap();
        state.board.set_piece(sq, Piece::new(kind, color));
    }

    #[test]
    fn plain_canter_jump_predicates() {
        let mut state = GameState::new();
        put(&mut state, "E6", PieceKind::Man, PlayerColor::White);
        put(&mut state, "F7", PieceKind::Man, PlayerColor::White);
        put(&mut state, "D7", PieceKind::Man, PlayerColor::Black);
        // Blocks the landing square of D7's jump over E6.
        put(&mut state, "F5", PieceKind::Man, PlayerColor::White);

        let e6 = Square::from_notation("E6").unwrap();
        let e7 = Square::from_notation("E7").unwrap();
        let g8 = Square::from_notation("G8").unwrap();
        let c8 = Square::from_notation("C8").unwrap();

        assert!(is_plain_move_valid(&state.board, e6, e7));
        assert!(is_canter_valid(&state.board, e6, g8, PlayerColor::White));
        assert!(!is_jump_valid(&state.board, e6, g8, PlayerColor::White));
        assert!(is_jump_valid(&state.board, e6, c8, PlayerColor::White));
        assert!(any_jump_available(&state.board, PlayerColor::White));
        assert!(!any_jump_available(&state.board, PlayerColor::Black));
    }

    #[test]
    fn builder_rejects_plain_after_canter() {
        let mut state = GameState::new();
        put(&mut state, "E6", PieceKind::Man, PlayerColor::White);
        put(&mut state, "F7", PieceKind::Man, PlayerColor::White);
        state.recompute_piece_counts();

        let mut builder =
            TurnBuilder::begin(&state, Square::from_notation("E6").unwrap()).unwrap();
        builder.step(Square::from_notation("G8").unwrap()).unwrap();
        let err = builder
            .step(Square::from_notation("G9").unwrap())
            .unwrap_err();
        assert_eq!(err, StepError::PlainMoveAfterFirstStep);
        assert_eq!(err.to_string(), "Can only make a plain move on the first step");
    }

    #[test]
    fn builder_man_cannot_charge() {
        let mut state = GameState::new();
        put(&mut state, "E6", PieceKind::Man, PlayerColor::White);
        put(&mut state, "F7", PieceKind::Man, PlayerColor::White);
        put(&mut state, "H9", PieceKind::Man, PlayerColor::Black);
        state.recompute_piece_counts();

        // E6-G8 canters over F7; G8xI10 would jump H9, but men cannot charge.
        let mut builder =
            TurnBuilder::begin(&state, Square::from_notation("E6").unwrap()).unwrap();
        builder.step(Square::from_notation("G8").unwrap()).unwrap();
        let err = builder
            .step(Square::from_notation("I10").unwrap())
            .unwrap_err();
        assert_eq!(err, StepError::KnightRequiredForCharge);
        assert_eq!(err.to_string(), "Only knights can jump after cantering");
    }

    #[test]
    fn builder_enforces_jump_continuation() {
        let mut state = GameState::new();
        put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
        put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
        put(&mut state, "H9", PieceKind::Man, PlayerColor::Black);
        state.recompute_piece_counts();

        let mut builder =
            TurnBuilder::begin(&state, Square::from_notation("E6").unwrap()).unwrap();
        builder.step(Square::from_notation("G8").unwrap()).unwrap();
        assert!(builder.must_continue());
        let err = builder.finish().unwrap_err();
        assert_eq!(err, StepError::MustContinueJumping);
        assert_eq!(err.to_string(), "Must continue jumping");
    }
}
