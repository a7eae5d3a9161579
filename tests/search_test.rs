use camelot_engine::board::{Piece, PieceKind, PlayerColor, Square};
use camelot_engine::evaluation::CHECKMATE;
use camelot_engine::game::GameState;
use camelot_engine::search::{self, Searcher};
use camelot_engine::{format_evaluation, Difficulty, Engine, EngineConfig};

fn put(state: &mut GameState, square: &str, kind: PieceKind, color: PlayerColor) {
    let sq = Square::from_notation(square).unwrap();
    state.board.set_piece(sq, Piece::new(kind, color));
}

fn finish_setup(state: &mut GameState) {
    state.recompute_piece_counts();
    state.recompute_hash();
}

fn quiet_searcher(seed: u64) -> Searcher {
    let mut searcher = Searcher::new(32);
    searcher.set_seed(seed);
    searcher.silent = true;
    searcher
}

#[test]
fn opening_search_finds_a_move() {
    let state = GameState::initial();
    let mut searcher = quiet_searcher(7);

    let outcome = search::search_best_turn(&mut searcher, &state, 2, 500);

    assert!(outcome.best_turn.is_some(), "no move from the opening");
    assert!(outcome.depth_reached >= 1, "depth 1 must complete in 500ms");
    assert!(outcome.nodes > 0);
    assert!(!outcome.pv.is_empty());
}

#[test]
fn mandatory_capture_reaches_the_root_choice() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "D7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "A4", PieceKind::Man, PlayerColor::White);
    put(&mut state, "L13", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    let mut searcher = quiet_searcher(11);
    let outcome = search::search_best_turn(&mut searcher, &state, 3, 2000);

    // With a jump available every legal turn captures, so whatever the root
    // picked (including a top-three shuffle) must be a capture.
    let best = outcome.best_turn.expect("capture position has turns");
    assert!(
        best.notation().contains('x'),
        "best turn is not a capture: {}",
        best.notation()
    );
}

#[test]
fn single_reply_short_circuits() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "A4", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "L13", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    let mut searcher = quiet_searcher(3);
    let outcome = search::search_best_turn(&mut searcher, &state, 5, 2000);

    assert_eq!(outcome.best_turn.unwrap().notation(), "E6xG8");
    assert_eq!(outcome.depth_reached, 0);
    assert_eq!(outcome.nodes, 0);
}

#[test]
fn stalemated_side_has_lost() {
    // Black man on A4 is fenced in: every plain move is blocked and every
    // jump landing square is occupied.
    let mut state = GameState::new();
    put(&mut state, "A4", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "A5", PieceKind::Man, PlayerColor::White);
    put(&mut state, "B3", PieceKind::Man, PlayerColor::White);
    put(&mut state, "B4", PieceKind::Man, PlayerColor::White);
    put(&mut state, "B5", PieceKind::Man, PlayerColor::White);
    put(&mut state, "A6", PieceKind::Man, PlayerColor::White);
    put(&mut state, "C2", PieceKind::Man, PlayerColor::White);
    put(&mut state, "C4", PieceKind::Man, PlayerColor::White);
    put(&mut state, "C6", PieceKind::Man, PlayerColor::White);
    state.turn = PlayerColor::Black;
    finish_setup(&mut state);

    assert_eq!(
        state.check_win_condition(PlayerColor::White).map(|w| w.to_str()),
        Some("stalemate")
    );

    let mut searcher = quiet_searcher(5);
    let outcome = search::search_best_turn(&mut searcher, &state, 4, 1000);

    assert!(outcome.best_turn.is_none());
    assert_eq!(outcome.score, -CHECKMATE);
    assert_eq!(outcome.depth_reached, 0);
}

#[test]
fn winning_capture_scores_as_mate() {
    // Two White men can each jump Black's last piece; either choice wins.
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Man, PlayerColor::White);
    put(&mut state, "G6", PieceKind::Man, PlayerColor::White);
    put(&mut state, "A4", PieceKind::Man, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    let mut engine = Engine::with_config(EngineConfig {
        max_depth: 3,
        time_limit_ms: 2000,
        tt_size_mb: 32,
    });
    engine.set_seed(19);
    engine.set_silent(true);
    engine.set_position(state);

    let analysis = engine.analyze_position();

    assert!(analysis.is_mate, "winning capture not seen as mate");
    assert!(analysis.evaluation_cp > CHECKMATE / 2.0);
    assert!(analysis.mate_in_moves.is_some());
    assert!(format_evaluation(analysis.evaluation_cp).starts_with('M'));
    let best = analysis.best_move.expect("a best move exists");
    assert!(best.contains('x'));
}

#[test]
fn seeded_search_is_reproducible() {
    let mut state = GameState::new();
    put(&mut state, "E6", PieceKind::Knight, PlayerColor::White);
    put(&mut state, "F7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "D7", PieceKind::Man, PlayerColor::Black);
    put(&mut state, "A4", PieceKind::Man, PlayerColor::White);
    put(&mut state, "L13", PieceKind::Man, PlayerColor::Black);
    finish_setup(&mut state);

    let mut first = quiet_searcher(42);
    let mut second = quiet_searcher(42);

    let a = search::search_best_turn(&mut first, &state, 3, 10_000);
    let b = search::search_best_turn(&mut second, &state, 3, 10_000);

    assert_eq!(
        a.best_turn.map(|t| t.notation()),
        b.best_turn.map(|t| t.notation())
    );
    assert_eq!(a.score, b.score);
    assert_eq!(a.depth_reached, b.depth_reached);
}

#[test]
fn difficulty_presets_match_documentation() {
    let easy = Difficulty::Easy.config();
    assert_eq!((easy.max_depth, easy.time_limit_ms, easy.tt_size_mb), (3, 500, 32));
    let medium = Difficulty::Medium.config();
    assert_eq!((medium.max_depth, medium.time_limit_ms, medium.tt_size_mb), (5, 2000, 64));
    let hard = Difficulty::Hard.config();
    assert_eq!((hard.max_depth, hard.time_limit_ms, hard.tt_size_mb), (8, 5000, 128));
    let expert = Difficulty::Expert.config();
    assert_eq!((expert.max_depth, expert.time_limit_ms, expert.tt_size_mb), (12, 10_000, 256));

    assert_eq!(Difficulty::from_str("expert"), Some(Difficulty::Expert));
    assert_eq!(Difficulty::from_str("grandmaster"), None);
}

#[test]
fn evaluation_formatting() {
    assert_eq!(format_evaluation(125.0), "+1.25");
    assert_eq!(format_evaluation(-50.0), "-0.50");
    assert!(format_evaluation(CHECKMATE - 4.0).starts_with('M'));
    assert!(format_evaluation(-(CHECKMATE - 4.0)).starts_with("-M"));
}
