use crate::board::PlayerColor;
use crate::evaluation::{self, CHECKMATE};
use crate::game::GameState;
use crate::moves::{self, CompleteTurn};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(target_arch = "wasm32")]
use js_sys::Date;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    // Simple wall-clock timer for wasm; avoids repeated window()/performance()
    // lookups in the hot path.
    Date::now()
}

pub const MAX_PLY: usize = 64;
pub const INFINITY: f64 = 1_000_000.0;

// Deadline polling cadence; elapsed-time reads cross the JS boundary on wasm.
const TIME_CHECK_MASK: u64 = 1023;

// Root variety: with this probability the root swaps its chosen turn for a
// uniform pick among the top scorers.
const ROOT_SHUFFLE_PROBABILITY: f64 = 0.2;
const ROOT_SHUFFLE_POOL: usize = 3;

mod tt;
pub use tt::{TTEntry, TTFlag, TranspositionTable};

mod ordering;
use ordering::{sort_captures, sort_turns};

pub mod zobrist;

/// Timer abstraction to handle platform differences
#[derive(Clone)]
pub struct Timer {
    #[cfg(target_arch = "wasm32")]
    start: f64,
    #[cfg(not(target_arch = "wasm32"))]
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self { start: now_ms() }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self {
                start: Instant::now(),
            }
        }
    }

    pub fn reset(&mut self) {
        #[cfg(target_arch = "wasm32")]
        {
            self.start = now_ms();
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start = Instant::now();
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        #[cfg(target_arch = "wasm32")]
        {
            (now_ms() - self.start) as u128
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_millis()
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

/// Seed for the engine RNG when the caller does not provide one.
fn clock_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        now_ms().to_bits()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x00C0_FFEE)
    }
}

/// Engine-lived search state: the transposition table survives across
/// searches within one game, and the RNG drives both evaluation jitter and
/// root randomization.
pub struct Searcher {
    pub nodes: u64,
    pub qnodes: u64,

    pub timer: Timer,
    pub time_limit_ms: u128,
    pub stopped: bool,

    pub tt: TranspositionTable,
    pub rng: SmallRng,

    // Silent mode - no info output
    pub silent: bool,

    // PV tracking (triangular table of turn notations)
    pv_table: Vec<Vec<Option<String>>>,
    pv_length: Vec<usize>,
}

impl Searcher {
    pub fn new(tt_size_mb: usize) -> Self {
        let mut pv_table = Vec::with_capacity(MAX_PLY);
        for _ in 0..MAX_PLY {
            pv_table.push(vec![None; MAX_PLY]);
        }

        Searcher {
            nodes: 0,
            qnodes: 0,
            timer: Timer::new(),
            time_limit_ms: u128::MAX,
            stopped: false,
            tt: TranspositionTable::new(tt_size_mb),
            rng: SmallRng::seed_from_u64(clock_seed()),
            silent: false,
            pv_table,
            pv_length: vec![0; MAX_PLY],
        }
    }

    /// Make every random choice (jitter, root shuffle) reproducible.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Forget everything learned in the current game.
    pub fn new_game(&mut self) {
        self.tt.clear();
    }

    fn reset_for_iteration(&mut self) {
        // Note: the timer is NOT reset here - the limit spans all iterations.
        for i in 0..MAX_PLY {
            self.pv_length[i] = 0;
            for j in 0..MAX_PLY {
                self.pv_table[i][j] = None;
            }
        }
    }

    #[inline]
    fn check_time(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.time_limit_ms == u128::MAX {
            return false;
        }
        if self.nodes & TIME_CHECK_MASK == 0
            && self.timer.elapsed_ms() >= self.time_limit_ms
        {
            self.stopped = true;
        }
        self.stopped
    }

    fn pv_line(&self) -> Vec<String> {
        (0..self.pv_length[0])
            .filter_map(|i| self.pv_table[0][i].clone())
            .collect()
    }

    /// Print a UCI-style info string after a completed depth.
    fn print_info(&self, depth: u32, score: f64) {
        if self.silent {
            return;
        }
        let time_ms = self.timer.elapsed_ms();
        let nps = if time_ms > 0 {
            (self.nodes as u128 * 1000) / time_ms
        } else {
            0
        };

        let score_str = if score > CHECKMATE / 2.0 {
            format!("mate {}", mate_in_moves(score))
        } else if score < -CHECKMATE / 2.0 {
            format!("mate -{}", mate_in_moves(score))
        } else {
            format!("cp {}", score as i64)
        };

        let line = format!(
            "info depth {} score {} nodes {} qnodes {} nps {} time {} hashfull {} pv {}",
            depth,
            score_str,
            self.nodes,
            self.qnodes,
            nps,
            time_ms,
            self.tt.fill_permille(),
            self.pv_line().join(" ")
        );

        #[cfg(target_arch = "wasm32")]
        {
            crate::log(&line);
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            eprintln!("{}", line);
        }
    }
}

/// Full moves until the forced win a mate-range score encodes.
pub fn mate_in_moves(score: f64) -> u32 {
    ((CHECKMATE - score.abs()) / 2.0).ceil() as u32
}

/// Result of one search call. `depth_reached` is the last fully completed
/// iteration; an aborted depth never leaks into the outcome.
pub struct SearchOutcome {
    pub best_turn: Option<CompleteTurn>,
    pub score: f64,
    pub depth_reached: u32,
    pub pv: Vec<String>,
    pub nodes: u64,
    pub qnodes: u64,
    pub time_ms: u128,
}

/// Iterative-deepening driver. Depths run 1..=max_depth under the wall
/// clock; when the deadline fires mid-depth that depth is discarded and the
/// previous one answers. Scores are from the side to move's perspective.
pub fn search_best_turn(
    searcher: &mut Searcher,
    game: &GameState,
    max_depth: u32,
    time_limit_ms: u64,
) -> SearchOutcome {
    searcher.timer.reset();
    searcher.time_limit_ms = time_limit_ms as u128;
    searcher.stopped = false;
    searcher.nodes = 0;
    searcher.qnodes = 0;

    let mut turns = moves::generate_turns(game);
    if turns.is_empty() {
        // Side to move has lost.
        return SearchOutcome {
            best_turn: None,
            score: -CHECKMATE,
            depth_reached: 0,
            pv: Vec::new(),
            nodes: 0,
            qnodes: 0,
            time_ms: searcher.timer.elapsed_ms(),
        };
    }

    if turns.len() == 1 {
        let only = turns.pop();
        let score = side_to_move_eval(searcher, game);
        let pv = only.iter().map(|t| t.notation()).collect();
        return SearchOutcome {
            best_turn: only,
            score,
            depth_reached: 0,
            pv,
            nodes: 0,
            qnodes: 0,
            time_ms: searcher.timer.elapsed_ms(),
        };
    }

    // First generated turn as the ultimate fallback.
    let mut best_turn = turns.into_iter().next();
    let mut best_score = -INFINITY;
    let mut depth_reached = 0;
    let mut pv = best_turn.iter().map(|t| t.notation()).collect::<Vec<_>>();

    for depth in 1..=max_depth {
        searcher.reset_for_iteration();

        if searcher.time_limit_ms != u128::MAX
            && searcher.timer.elapsed_ms() >= searcher.time_limit_ms
        {
            searcher.stopped = true;
            break;
        }

        let result = negamax_root(searcher, game, depth);

        if searcher.stopped {
            // Partial depth: discard, keep the previous iteration's answer.
            break;
        }

        if let Some((turn, score)) = result {
            best_turn = Some(turn);
            best_score = score;
            depth_reached = depth;
            pv = searcher.pv_line();
            searcher.print_info(depth, score);

            if score.abs() > CHECKMATE / 2.0 {
                break;
            }
        } else {
            break;
        }
    }

    SearchOutcome {
        best_turn,
        score: best_score,
        depth_reached,
        pv,
        nodes: searcher.nodes,
        qnodes: searcher.qnodes,
        time_ms: searcher.timer.elapsed_ms(),
    }
}

/// Root node: a normal negamax node that keeps the turn objects, plus the
/// 20% top-three shuffle for variety.
fn negamax_root(
    searcher: &mut Searcher,
    game: &GameState,
    depth: u32,
) -> Option<(CompleteTurn, f64)> {
    searcher.pv_length[0] = 0;

    let hash = game.generate_hash();
    let tt_turn = searcher.tt.probe(hash).and_then(|e| e.best_turn.clone());

    let mut turns = moves::generate_turns(game);
    if turns.is_empty() {
        return None;
    }
    sort_turns(&mut turns, game.turn, tt_turn.as_deref());

    let mut alpha = -INFINITY;
    let beta = INFINITY;
    let mut best_idx = 0usize;
    let mut best_score = -INFINITY;
    let mut scored: Vec<(usize, f64)> = Vec::with_capacity(turns.len());

    for (i, turn) in turns.iter().enumerate() {
        if searcher.check_time() {
            break;
        }

        let child = game.after_turn(turn);
        let score = -negamax(searcher, &child, depth - 1, 1, -beta, -alpha);

        if searcher.stopped {
            break;
        }

        scored.push((i, score));

        if score > best_score {
            best_score = score;
            best_idx = i;

            if score > alpha {
                alpha = score;

                // Update PV from the child's line.
                update_root_pv(searcher, turn);
            }
        }
    }

    if searcher.stopped || scored.is_empty() {
        return None;
    }

    searcher.tt.store(TTEntry {
        hash,
        depth: depth as i32,
        score: best_score,
        flag: TTFlag::Exact,
        best_turn: Some(turns[best_idx].notation()),
    });

    // Occasionally play one of the runners-up instead of the top choice.
    let mut chosen = best_idx;
    let mut chosen_score = best_score;
    if scored.len() > 1 && searcher.rng.gen::<f64>() < ROOT_SHUFFLE_PROBABILITY {
        let mut ranked = scored.clone();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let pick = searcher.rng.gen_range(0..ranked.len().min(ROOT_SHUFFLE_POOL));
        chosen = ranked[pick].0;
        chosen_score = ranked[pick].1;
        if chosen != best_idx {
            // The reported line now starts with the shuffled choice.
            searcher.pv_table[0][0] = Some(turns[chosen].notation());
            searcher.pv_length[0] = 1;
        }
    }

    Some((turns[chosen].clone(), chosen_score))
}

fn update_root_pv(searcher: &mut Searcher, turn: &CompleteTurn) {
    searcher.pv_table[0][0] = Some(turn.notation());
    searcher.pv_length[0] = searcher.pv_length[1].max(1);
    for j in 1..searcher.pv_length[1] {
        searcher.pv_table[0][j] = searcher.pv_table[1][j].clone();
    }
}

/// Negamax with alpha-beta and the transposition table.
fn negamax(
    searcher: &mut Searcher,
    game: &GameState,
    depth: u32,
    ply: usize,
    mut alpha: f64,
    mut beta: f64,
) -> f64 {
    searcher.nodes += 1;
    searcher.pv_length[ply] = ply;

    if searcher.check_time() {
        return 0.0;
    }

    if ply >= MAX_PLY - 1 {
        return side_to_move_eval(searcher, game);
    }

    let hash = game.generate_hash();
    let mut tt_turn: Option<String> = None;

    if let Some(entry) = searcher.tt.probe(hash) {
        if entry.depth >= depth as i32 {
            match entry.flag {
                TTFlag::Exact => return entry.score,
                TTFlag::LowerBound => alpha = alpha.max(entry.score),
                TTFlag::UpperBound => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return entry.score;
            }
        }
        tt_turn = entry.best_turn.clone();
    }

    if depth == 0 {
        return quiescence(searcher, game, ply, alpha, beta);
    }

    let mut turns = moves::generate_turns(game);
    if turns.is_empty() {
        // Lost: no legal turn. Adding the remaining depth makes nearer
        // mates score worse for the losing side, so the winner steers
        // towards the quickest finish.
        return -CHECKMATE + depth as f64;
    }
    sort_turns(&mut turns, game.turn, tt_turn.as_deref());

    let mut best_score = -INFINITY;
    let mut best_turn: Option<&CompleteTurn> = None;
    let mut flag = TTFlag::UpperBound;

    for turn in &turns {
        if searcher.check_time() {
            break;
        }

        let child = game.after_turn(turn);
        let score = -negamax(searcher, &child, depth - 1, ply + 1, -beta, -alpha);

        if searcher.stopped {
            return best_score;
        }

        if score > best_score {
            best_score = score;
            best_turn = Some(turn);

            if score > alpha {
                alpha = score;
                flag = TTFlag::Exact;

                // Update PV
                searcher.pv_table[ply][ply] = Some(turn.notation());
                searcher.pv_length[ply] = searcher.pv_length[ply + 1].max(ply + 1);
                for j in (ply + 1)..searcher.pv_length[ply + 1] {
                    searcher.pv_table[ply][j] = searcher.pv_table[ply + 1][j].clone();
                }
            }
        }

        if alpha >= beta {
            flag = TTFlag::LowerBound;
            break;
        }
    }

    if searcher.stopped {
        return best_score;
    }

    searcher.tt.store(TTEntry {
        hash,
        depth: depth as i32,
        score: best_score,
        flag,
        best_turn: best_turn.map(|t| t.notation()),
    });

    best_score
}

/// Quiescence search: captures only, with a stand-pat bound from the static
/// evaluation. Chained jumps are exactly the horizon this exists for.
fn quiescence(searcher: &mut Searcher, game: &GameState, ply: usize, mut alpha: f64, beta: f64) -> f64 {
    searcher.nodes += 1;
    searcher.qnodes += 1;

    if searcher.check_time() {
        return 0.0;
    }

    let stand_pat = side_to_move_eval(searcher, game);

    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    if ply >= MAX_PLY - 1 {
        return stand_pat;
    }

    let mut captures = moves::generate_capture_turns(game);
    sort_captures(&mut captures);

    let mut best_score = stand_pat;

    for turn in &captures {
        let child = game.after_turn(turn);
        let score = -quiescence(searcher, &child, ply + 1, -beta, -alpha);

        if searcher.stopped {
            return best_score;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                alpha = score;
            }
        }

        if alpha >= beta {
            break;
        }
    }

    best_score
}

/// Static evaluation from the side to move's perspective.
fn side_to_move_eval(searcher: &mut Searcher, game: &GameState) -> f64 {
    let white_score = evaluation::evaluate(game, &mut searcher.rng);
    match game.turn {
        PlayerColor::White => white_score,
        PlayerColor::Black => -white_score,
    }
}
