//! Best-move table
//!
//! One slot per `key % capacity`, overwritten unconditionally. Unlike a
//! transposition table it stores no score or depth, only the last best
//! move seen for a position, used to order moves and rebuild the PV.

use crate::moves::Move;

/// Default number of slots
pub const DEFAULT_PV_ENTRIES: usize = 20_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PvEntry {
    key: u64,
    mv: Move,
}

pub struct PvTable {
    entries: Vec<PvEntry>,
}

impl PvTable {
    pub fn new(capacity: usize) -> Self {
        PvTable {
            entries: vec![PvEntry::default(); capacity.max(1)],
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.fill(PvEntry::default());
    }

    pub fn store(&mut self, key: u64, mv: Move) {
        let index = self.index(key);
        self.entries[index] = PvEntry { key, mv };
    }

    /// The move stored for exactly this key, if any
    pub fn probe(&self, key: u64) -> Option<Move> {
        let entry = self.entries[self.index(key)];
        if entry.key == key && !entry.mv.is_none() {
            Some(entry.mv)
        } else {
            None
        }
    }
}

impl Default for PvTable {
    fn default() -> Self {
        PvTable::new(DEFAULT_PV_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::*;

    #[test]
    fn probe_requires_full_key() {
        let mut table = PvTable::new(100);
        let mv = Move::quiet(E1, F1);
        table.store(12345, mv);
        assert_eq!(table.probe(12345), Some(mv));
        // same slot, different key
        assert_eq!(table.probe(12445), None);
        assert_eq!(table.probe(7), None);
    }

    #[test]
    fn colliding_store_overwrites() {
        let mut table = PvTable::new(10);
        table.store(3, Move::quiet(A1, B1));
        table.store(13, Move::quiet(A1, C1));
        assert_eq!(table.probe(3), None);
        assert_eq!(table.probe(13), Some(Move::quiet(A1, C1)));

        table.clear();
        assert_eq!(table.probe(13), None);
        assert_eq!(table.capacity(), 10);
    }

    #[test]
    fn empty_slots_never_match_key_zero() {
        let table = PvTable::default();
        assert_eq!(table.probe(0), None);
    }
}
