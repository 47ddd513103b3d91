use crate::engine::zobrist::ZobristKeys;
use crate::engine::Move;
use crate::logic::board::Board;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TT_CAPACITY: usize = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TTFlag {
    Exact,
    LowerBound, // Beta cutoff (fail-high)
    UpperBound, // Alpha cutoff (fail-low)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u8,
    pub flag: TTFlag,
    /// Search that wrote the entry.
    pub generation: u32,
    /// Store counter at the time of writing; larger is newer.
    pub stamp: u64,
}

/// Bounded position cache. Collisions are accepted; the hash is the identity.
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    keys: ZobristKeys,
    capacity: usize,
    generation: u32,
    stamp: u64,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_TT_CAPACITY)
    }
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        Self::with_keys(capacity, ZobristKeys::default())
    }

    pub fn with_keys(capacity: usize, keys: ZobristKeys) -> Self {
        let capacity = capacity.max(16);
        Self {
            entries: HashMap::with_capacity(capacity),
            keys,
            capacity,
            generation: 0,
            stamp: 0,
        }
    }

    /// Starts a new search generation. Entries from earlier searches are evicted first.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }

    pub fn hash(&self, board: &Board) -> u64 {
        self.keys.hash(board)
    }

    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        self.entries.get(&key).copied()
    }

    /// Miss when absent or when the stored search was shallower than `min_depth`.
    pub fn get(&self, board: &Board, min_depth: u8) -> Option<TTEntry> {
        self.probe(self.hash(board))
            .filter(|entry| entry.depth >= min_depth)
    }

    pub fn set(
        &mut self,
        board: &Board,
        depth: u8,
        score: i32,
        best_move: Option<Move>,
        flag: TTFlag,
    ) {
        let key = self.hash(board);
        self.store(key, best_move, score, depth, flag);
    }

    pub fn store(
        &mut self,
        key: u64,
        best_move: Option<Move>,
        score: i32,
        depth: u8,
        flag: TTFlag,
    ) {
        // Replacement scheme: keep the deeper search for the same key
        if let Some(existing) = self.entries.get(&key) {
            if depth < existing.depth {
                return;
            }
        }

        self.stamp += 1;
        self.entries.insert(
            key,
            TTEntry {
                key,
                best_move,
                score,
                depth,
                flag,
                generation: self.generation,
                stamp: self.stamp,
            },
        );

        if self.entries.len() * 5 > self.capacity * 4 {
            self.evict();
        }
    }

    /// Drops a fifth of the capacity: earlier searches first, then the
    /// shallowest entries of a search, then the oldest among equal depths.
    fn evict(&mut self) {
        let target = (self.capacity / 5).max(1);
        let mut order: Vec<(u32, u8, u64, u64)> = self
            .entries
            .values()
            .map(|e| (e.generation, e.depth, e.stamp, e.key))
            .collect();
        order.sort_unstable();
        for (_, _, _, key) in order.into_iter().take(target) {
            self.entries.remove(&key);
        }
        log::trace!(
            "transposition table evicted {} entries, {} remain",
            target,
            self.entries.len()
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = 0;
        self.stamp = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Square;

    #[test]
    fn test_depth_gated_lookup() {
        let mut tt = TranspositionTable::new(1000);
        let board = Board::new();
        let best = Move::new(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
        );
        tt.set(&board, 3, 42, Some(best), TTFlag::Exact);

        assert!(tt.get(&board, 5).is_none());
        assert_eq!(tt.get(&board, 3).map(|e| e.score), Some(42));
        let entry = tt.get(&board, 2).unwrap();
        assert_eq!(entry.best_move.unwrap().to_string(), "e2e4");
        assert_eq!(entry.flag, TTFlag::Exact);
    }

    #[test]
    fn test_shallower_store_does_not_overwrite() {
        let mut tt = TranspositionTable::new(1000);
        let board = Board::new();
        tt.set(&board, 4, 10, None, TTFlag::Exact);
        tt.set(&board, 2, 99, None, TTFlag::LowerBound);
        assert_eq!(tt.get(&board, 0).map(|e| e.score), Some(10));
        tt.set(&board, 4, 20, None, TTFlag::UpperBound);
        assert_eq!(tt.get(&board, 0).map(|e| e.score), Some(20));
    }

    #[test]
    fn test_eviction_keeps_table_bounded() {
        let mut tt = TranspositionTable::new(100);
        for key in 0..200u64 {
            tt.store(key, None, 0, 1, TTFlag::Exact);
        }
        assert!(tt.len() <= 80);
        // The newest entry survives, the oldest are gone
        assert!(tt.probe(199).is_some());
        assert!(tt.probe(0).is_none());

        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.capacity(), 100);
    }

    #[test]
    fn test_eviction_prefers_shallow_then_stale_entries() {
        let mut tt = TranspositionTable::new(100);
        tt.new_search();
        // 81 stores trigger one eviction of 20 entries
        for key in 0..=80u64 {
            let depth = if key % 2 == 0 { 5 } else { 1 };
            tt.store(key, None, 0, depth, TTFlag::Exact);
        }
        assert_eq!(tt.len(), 61);
        assert!(tt.probe(0).is_some());
        assert!(tt.probe(1).is_none());
        assert!(tt.probe(39).is_none());
        assert!(tt.probe(41).is_some());

        // A later search pushes out the previous one's entries, deep or not
        tt.new_search();
        assert_eq!(tt.generation(), 2);
        for key in 1000..1040u64 {
            tt.store(key, None, 0, 1, TTFlag::Exact);
        }
        assert_eq!(tt.len(), 61);
        assert!(tt.probe(79).is_none());
        assert!(tt.probe(0).is_none());
        assert!(tt.probe(40).is_some());
        assert!((1000..1040u64).all(|key| tt.probe(key).is_some()));
    }
}
