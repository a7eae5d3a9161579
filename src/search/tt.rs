//! Bounded transposition table.
//!
//! Hash -> entry map with depth-preferring overwrite and FIFO eviction once
//! the byte budget's entry count is exceeded. Key collisions between
//! distinct positions are not defended against; probe results are advisory
//! and the stored best-turn notation is only used to bias move ordering.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Rough in-memory footprint of one entry including map overhead, used to
/// turn a megabyte budget into an entry count.
const APPROX_ENTRY_BYTES: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Clone)]
pub struct TTEntry {
    pub hash: u64,
    pub depth: i32,
    pub score: f64,
    pub flag: TTFlag,
    pub best_turn: Option<String>,
}

pub struct TranspositionTable {
    map: FxHashMap<u64, TTEntry>,
    /// Insertion order for FIFO eviction. Keys appear once; overwriting an
    /// entry keeps its original age.
    order: VecDeque<u64>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(size_mb: usize) -> Self {
        let capacity = (size_mb.max(1) * 1024 * 1024) / APPROX_ENTRY_BYTES;
        TranspositionTable {
            map: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
        }
    }

    #[inline]
    pub fn probe(&self, hash: u64) -> Option<&TTEntry> {
        self.map.get(&hash)
    }

    /// Depth-preferring store: an existing entry is only overwritten by an
    /// equal or deeper search of the same hash.
    pub fn store(&mut self, entry: TTEntry) {
        let hash = entry.hash;
        if let Some(existing) = self.map.get(&hash) {
            if entry.depth >= existing.depth {
                self.map.insert(hash, entry);
            }
            return;
        }

        self.map.insert(hash, entry);
        self.order.push_back(hash);
        while self.map.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.map.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Occupancy in permille of capacity, for the search info line.
    pub fn fill_permille(&self) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        self.map.len() * 1000 / self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: u64, depth: i32, score: f64) -> TTEntry {
        TTEntry {
            hash,
            depth,
            score,
            flag: TTFlag::Exact,
            best_turn: None,
        }
    }

    #[test]
    fn store_and_probe() {
        let mut tt = TranspositionTable::new(1);
        tt.store(entry(0x1234, 5, 120.0));
        let hit = tt.probe(0x1234).unwrap();
        assert_eq!(hit.depth, 5);
        assert_eq!(hit.score, 120.0);
        assert!(tt.probe(0x9999).is_none());
    }

    #[test]
    fn deeper_entries_are_preferred() {
        let mut tt = TranspositionTable::new(1);
        tt.store(entry(7, 6, 10.0));
        tt.store(entry(7, 3, 99.0)); // shallower: ignored
        assert_eq!(tt.probe(7).unwrap().score, 10.0);
        tt.store(entry(7, 8, 42.0)); // deeper: replaces
        assert_eq!(tt.probe(7).unwrap().score, 42.0);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn oldest_insertion_is_evicted_first() {
        let mut tt = TranspositionTable::new(1);
        tt.capacity = 3;
        for hash in 0..4u64 {
            tt.store(entry(hash, 1, hash as f64));
        }
        assert_eq!(tt.len(), 3);
        assert!(tt.probe(0).is_none());
        assert!(tt.probe(1).is_some() && tt.probe(3).is_some());
    }

    #[test]
    fn clear_empties_the_table() {
        let mut tt = TranspositionTable::new(1);
        tt.store(entry(1, 1, 0.0));
        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.fill_permille(), 0);
    }
}
