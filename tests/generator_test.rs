use camelot_engine::board::{Piece, PieceKind, PlayerColor, Square};
use camelot_engine::game::GameState;
use camelot_engine::moves;

fn put(state: &mut GameState, square: &str, kind: PieceKind, color: PlayerColor) {
    let sq = Square::from_notation(square).unwrap();
    state.board.set_piece(sq, Piece::new(kind, color));
}

fn finish_setup(state: &mut GameState) {
    state.recompute_piece_counts();
    state.recompute_hash();
}

fn notations(state: &GameState) -> Vec<String> {
    moves::generate_turns(state)
        .iter()
        .map(|t| t.notation())
        .collect()
}

#[test]
fn opening_position_has_turns() {
    let state = GameState::initial();
    let turns = moves::generate_turns(&state);

    assert!(!turns.is_empty(), "White must have turns at the start");

    let mut seen = std::collections::HashSet::new();
    for t in &turns {
        assert!(
            seen.insert(t.notation()),
            "duplicate turn emitted: {}",
            t.notation()
        );

        // Every turn starts on a White piece and ends off its origin.
        let origin_piece = state.board.get_piece(t.origin()).unwrap();
        assert_eq!(origin_piece.color, PlayerColor::White);
        assert_ne!(t.origin(), t.terminal());

        // No jumps exist in the opening position.
        assert!(t.captured.is_empty(), "unexpected capture: {}", t.notation());

        // Piece counts are preserved by capture-free turns.
        let after = state.after_turn(t);
        assert_eq!(after.white_piece_count, 14);
        assert_eq!(after.black_piece_count, 14);
    }
}

#[test]
fn forced_capture_is_the_only_turn() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "A4", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "L13", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    assert!(moves::any_jump_available(&state.board, PlayerColor::White));
    assert_eq!(notations(&state), vec!["E6xG8"]);

    for t in moves::generate_turns(&state) {
        assert!(!t.captured.is_empty(), "mandatory capture violated");
    }
}

#[test]
fn jump_chains_are_forced_to_completion() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "F9", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "D9", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    // E6xG8 must keep jumping: G8 over F9 to E10, then E10 over D9 to C8.
    assert_eq!(notations(&state), vec!["E6xG8xE10xC8"]);

    let turn = &moves::generate_turns(&state)[0];
    assert_eq!(turn.captured.len(), 3);
    let after = state.after_turn(turn);
    assert_eq!(after.black_piece_count, 0);
    assert_eq!(after.white_piece_count, 1);
}

#[test]
fn jump_into_opponent_castle_ends_the_turn() {
    let mut state = GameState::new();
    put(&mut state, "F14", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F15", PieceKind::Man, PlayerColor::Black);
    // From F16 a jump over G15 to H14 would be legal; castle entry ends the
    // turn first.
    put(&mut state, "G15", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    assert_eq!(notations(&state), vec!["F14xF16"]);
    let turn = &moves::generate_turns(&state)[0];
    assert_eq!(turn.captured.len(), 1);
    assert_eq!(turn.terminal().to_string(), "F16");
}

#[test]
fn canter_chains_can_stop_anywhere() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Man, PlayerColor::White);
    put(&mut state, "D7", PieceKind::Man, PlayerColor::White);
    put(&mut state, "B8", PieceKind::Man, PlayerColor::White);
    put(&mut state, "L13", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    let all = notations(&state);
    assert!(all.contains(&"E6-C8".to_string()), "missing single canter");
    assert!(
        all.contains(&"E6-C8-A8".to_string()),
        "missing canter chain continuation"
    );
}

#[test]
fn turns_never_revisit_squares() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "E7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "F8", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "F6", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "D5", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    for t in moves::generate_turns(&state) {
        assert_ne!(t.origin(), t.terminal(), "turn ends on its origin: {}", t.notation());
        let interior = &t.path[1..];
        let mut seen = std::collections::HashSet::new();
        for sq in interior {
            if *sq != t.origin() {
                assert!(seen.insert(*sq), "square revisited in {}", t.notation());
            }
        }
    }
}

#[test]
fn men_do_not_charge() {
    // A man may canter, but its canter chain may never turn into jumps.
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Man, PlayerColor::White);
    put(&mut state, "D7", PieceKind::Man, PlayerColor::White);
    put(&mut state, "B9", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    // C8 canter brings the man next to B9; only a knight could continue
    // with the jump C8xA10.
    for n in notations(&state) {
        assert!(
            !n.contains('x'),
            "man performed a charge: {}",
            n
        );
    }
}

#[test]
fn knights_charge_when_no_jump_is_available() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "D7", PieceKind::Man, PlayerColor::White);
    put(&mut state, "B9", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    // No immediate jump exists, so canter starts are legal; the knight can
    // canter E6-C8 and then jump B9.
    assert!(!moves::any_jump_available(&state.board, PlayerColor::White));
    let all = notations(&state);
    assert!(
        all.contains(&"E6-C8xA10".to_string()),
        "knight charge missing from {:?}",
        all
    );
}

#[test]
fn perft_counts_the_forced_line() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "A4", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "L13", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    assert_eq!(state.perft(0), 1);
    assert_eq!(state.perft(1), 1);
}
