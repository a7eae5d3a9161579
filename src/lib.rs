use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub mod board;
pub mod evaluation;
pub mod game;
pub mod moves;
pub mod search;

use board::{Piece, PieceKind, PlayerColor, Square};
use evaluation::CHECKMATE;
use game::GameState;
use moves::CompleteTurn;
use search::Searcher;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// Engine options. All fields optional on the wire; missing ones take the
/// defaults below.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_depth: u32,
    pub time_limit_ms: u64,
    pub tt_size_mb: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: 10,
            time_limit_ms: 5000,
            tt_size_mb: 128,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" | "Easy" => Some(Difficulty::Easy),
            "medium" | "Medium" => Some(Difficulty::Medium),
            "hard" | "Hard" => Some(Difficulty::Hard),
            "expert" | "Expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    pub fn config(&self) -> EngineConfig {
        match self {
            Difficulty::Easy => EngineConfig {
                max_depth: 3,
                time_limit_ms: 500,
                tt_size_mb: 32,
            },
            Difficulty::Medium => EngineConfig {
                max_depth: 5,
                time_limit_ms: 2000,
                tt_size_mb: 64,
            },
            Difficulty::Hard => EngineConfig {
                max_depth: 8,
                time_limit_ms: 5000,
                tt_size_mb: 128,
            },
            Difficulty::Expert => EngineConfig {
                max_depth: 12,
                time_limit_ms: 10_000,
                tt_size_mb: 256,
            },
        }
    }
}

/// Search report for one position, from the side to move's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub best_move: Option<String>,
    pub evaluation_cp: f64,
    pub depth_reached: u32,
    pub principal_variation: Vec<String>,
    pub nodes_searched: u64,
    pub nodes_per_second: u64,
    pub time_ms: u64,
    pub is_mate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mate_in_moves: Option<u32>,
}

/// Pawn-unit display string: "+1.25", "-0.50", "M3" / "-M3" for forced
/// mates.
pub fn format_evaluation(score: f64) -> String {
    if score > CHECKMATE / 2.0 {
        format!("M{}", search::mate_in_moves(score))
    } else if score < -CHECKMATE / 2.0 {
        format!("-M{}", search::mate_in_moves(score))
    } else {
        format!("{:+.2}", score / 100.0)
    }
}

// ==================== JS wire types ====================

#[derive(Deserialize)]
struct JsGame {
    board: JsBoard,
    turn: String,
    #[serde(default)]
    castle_moves: JsCastleMoves,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    config: Option<EngineConfig>,
    /// Optional RNG seed for reproducible play and testing.
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct JsBoard {
    pieces: Vec<JsPiece>,
}

#[derive(Deserialize)]
struct JsPiece {
    square: String, // "E6"
    kind: String,   // "man" | "knight"
    color: String,  // "white" | "black"
}

#[derive(Deserialize, Default)]
struct JsCastleMoves {
    #[serde(default)]
    white: u8,
    #[serde(default)]
    black: u8,
}

#[derive(Serialize)]
struct JsTurn {
    notation: String,
    path: Vec<String>,
    captured: Vec<String>,
}

impl JsTurn {
    fn from_turn(turn: &CompleteTurn) -> Self {
        JsTurn {
            notation: turn.notation(),
            path: turn.path.iter().map(|s| s.to_string()).collect(),
            captured: turn.captured.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ==================== Engine façade ====================

/// One engine instance: a position, the persistent search state (the
/// transposition table survives between searches until `new_game`), and the
/// RNG behind jitter and root variety.
#[wasm_bindgen]
pub struct Engine {
    game: GameState,
    config: EngineConfig,
    searcher: Searcher,
}

impl Engine {
    /// Native constructor; the wasm entry point goes through JSON.
    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            game: GameState::initial(),
            config,
            searcher: Searcher::new(config.tt_size_mb),
        }
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Engine::with_config(difficulty.config())
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn set_position(&mut self, game: GameState) {
        self.game = game;
    }

    /// Run the configured search on the current position.
    pub fn analyze_position(&mut self) -> Analysis {
        let outcome = search::search_best_turn(
            &mut self.searcher,
            &self.game,
            self.config.max_depth,
            self.config.time_limit_ms,
        );

        let is_mate = outcome.score.abs() > CHECKMATE / 2.0;
        let nodes_per_second = if outcome.time_ms > 0 {
            (outcome.nodes as u128 * 1000 / outcome.time_ms) as u64
        } else {
            0
        };

        Analysis {
            best_move: outcome.best_turn.as_ref().map(|t| t.notation()),
            evaluation_cp: outcome.score,
            depth_reached: outcome.depth_reached,
            principal_variation: outcome.pv,
            nodes_searched: outcome.nodes,
            nodes_per_second,
            time_ms: outcome.time_ms as u64,
            is_mate,
            mate_in_moves: if is_mate {
                Some(search::mate_in_moves(outcome.score))
            } else {
                None
            },
        }
    }

    pub fn legal_turns(&self) -> Vec<CompleteTurn> {
        moves::generate_turns(&self.game)
    }

    /// Play the turn with the given notation, if it is legal.
    pub fn play(&mut self, notation: &str) -> bool {
        let found = moves::generate_turns(&self.game)
            .into_iter()
            .find(|t| t.notation() == notation);
        match found {
            Some(turn) => {
                self.game = self.game.after_turn(&turn);
                true
            }
            None => false,
        }
    }
}

#[wasm_bindgen]
impl Engine {
    /// Build an engine from a JSON game snapshot: piece list, side to move,
    /// castle counters, optional difficulty preset / explicit config / seed.
    #[wasm_bindgen(constructor)]
    pub fn new(json_state: JsValue) -> Result<Engine, JsValue> {
        let js_game: JsGame = serde_wasm_bindgen::from_value(json_state)?;

        let mut state = GameState::new();
        for p in &js_game.board.pieces {
            let sq = Square::from_notation(&p.square)
                .ok_or_else(|| JsValue::from_str("Invalid square"))?;
            let kind = PieceKind::from_str(&p.kind)
                .ok_or_else(|| JsValue::from_str("Invalid piece kind"))?;
            let color = PlayerColor::from_str(&p.color)
                .ok_or_else(|| JsValue::from_str("Invalid piece color"))?;
            state.board.set_piece(sq, Piece::new(kind, color));
        }
        state.turn = PlayerColor::from_str(&js_game.turn).unwrap_or(PlayerColor::White);
        state.castle_moves = [js_game.castle_moves.white, js_game.castle_moves.black];
        state.recompute_piece_counts();
        state.recompute_hash();

        let config = js_game
            .config
            .or_else(|| {
                js_game
                    .difficulty
                    .as_deref()
                    .and_then(Difficulty::from_str)
                    .map(|d| d.config())
            })
            .unwrap_or_default();

        let mut engine = Engine::with_config(config);
        engine.game = state;
        if let Some(seed) = js_game.seed {
            engine.searcher.set_seed(seed);
        }
        Ok(engine)
    }

    /// Switch to a difficulty preset; true on a recognized name.
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        match Difficulty::from_str(name) {
            Some(difficulty) => {
                self.config = difficulty.config();
                self.searcher = Searcher::new(self.config.tt_size_mb);
                true
            }
            None => false,
        }
    }

    /// Re-seed the engine RNG (jitter and root randomization).
    pub fn set_seed(&mut self, seed: u64) {
        self.searcher.set_seed(seed);
    }

    /// Reset to the starting placement and clear the transposition table.
    pub fn new_game(&mut self) {
        self.game = GameState::initial();
        self.searcher.new_game();
    }

    pub fn set_silent(&mut self, silent: bool) {
        self.searcher.silent = silent;
    }

    /// All legal turns as an array of {notation, path, captured}.
    pub fn get_legal_turns(&self) -> JsValue {
        let turns: Vec<JsTurn> = self
            .legal_turns()
            .iter()
            .map(JsTurn::from_turn)
            .collect();
        serde_wasm_bindgen::to_value(&turns).unwrap_or(JsValue::NULL)
    }

    /// Static evaluation of the current position from White's perspective.
    pub fn evaluate_position(&mut self) -> f64 {
        evaluation::evaluate(&self.game, &mut self.searcher.rng)
    }

    /// Win check for one color: "castle_occupation", "capture_all" or
    /// "stalemate" when that color has won, null otherwise.
    pub fn check_win(&self, color: &str) -> Option<String> {
        let color = PlayerColor::from_str(color)?;
        self.game
            .check_win_condition(color)
            .map(|w| w.to_str().to_string())
    }

    /// Search the current position and return the analysis object.
    pub fn analyze(&mut self) -> JsValue {
        let analysis = self.analyze_position();
        serde_wasm_bindgen::to_value(&analysis).unwrap_or(JsValue::NULL)
    }

    /// Formatted evaluation of the last analysis score, e.g. "+1.25".
    pub fn format_score(&self, score: f64) -> String {
        format_evaluation(score)
    }

    /// Play a turn by notation; true when it was legal.
    pub fn play_turn(&mut self, notation: &str) -> bool {
        self.play(notation)
    }

    /// Complete-turn sequence count to the given depth (generator debugging).
    pub fn perft(&self, depth: usize) -> u64 {
        self.game.perft(depth)
    }
}
