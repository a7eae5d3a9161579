use crate::board::PlayerColor;
use crate::moves::CompleteTurn;

// Ordering scores (higher = searched first). Capture count dominates, then
// castle entry, then forward progress; a turn matching the table's stored
// best line goes to the front outright.
const SORT_HASH: i64 = 1_000_000_000;
const SORT_CAPTURE: i64 = 1_000_000;
const SORT_CASTLE_ENTRY: i64 = 1_000;

/// Order turns for alpha-beta. The sort is stable, so equally scored turns
/// keep the generator's order.
pub fn sort_turns(turns: &mut Vec<CompleteTurn>, side: PlayerColor, tt_turn: Option<&str>) {
    let enemy_castle = side.enemy_castle();
    turns.sort_by_cached_key(|t| {
        let mut score: i64 = 0;
        if let Some(best) = tt_turn {
            if t.notation() == best {
                score += SORT_HASH;
            }
        }
        score += t.captured.len() as i64 * SORT_CAPTURE;
        if enemy_castle.contains(&t.terminal()) {
            score += SORT_CASTLE_ENTRY;
        }
        score += t.forward_progress(side) as i64;
        // Ascending sort key; negate so the best turn comes first.
        -score
    });
}

/// Quiescence ordering: biggest hauls first.
pub fn sort_captures(turns: &mut Vec<CompleteTurn>) {
    turns.sort_by_cached_key(|t| -(t.captured.len() as i64));
}
