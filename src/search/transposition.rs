#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Score is a lower bound (stored after a beta cutoff).
    Lower,
    /// Score is an upper bound (search failed low).
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub hash: u64,
    pub depth: u32,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<(usize, usize)>,
    pub age: u32,
}

/// Result of a probe. A miss may still carry the stored best move for move
/// ordering.
#[derive(Debug, Default)]
pub struct TtProbe {
    pub score: Option<i32>,
    pub best_move: Option<(usize, usize)>,
}

/// Open-addressed fixed-size transposition table. Slots are selected by
/// masking the hash; the full hash is stored for verification. Replacement
/// prefers empty slots, deeper entries, and newer searches.
pub struct TranspositionTable {
    entries: Vec<Option<TtEntry>>,
    mask: usize,
    age: u32,
    occupied: usize,
    hits: u64,
    misses: u64,
    collisions: u64,
}

impl TranspositionTable {
    /// `capacity` is rounded up to a power of two.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two().max(1024);
        Self {
            entries: vec![None; capacity],
            mask: capacity - 1,
            age: 0,
            occupied: 0,
            hits: 0,
            misses: 0,
            collisions: 0,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Bump the age counter at every new search root.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
        if self.occupied * 4 >= self.entries.len() * 3 {
            self.compact();
        }
    }

    /// Probe for a usable score. The stored score is returned only when the
    /// entry was searched at least as deep and its bound is compatible with
    /// the (alpha, beta) window; otherwise only the best move comes back.
    pub fn probe(&mut self, hash: u64, depth: u32, alpha: i32, beta: i32) -> TtProbe {
        let slot = self.slot(hash);
        let Some(entry) = self.entries[slot] else {
            self.misses += 1;
            return TtProbe::default();
        };

        if entry.hash != hash {
            self.collisions += 1;
            self.misses += 1;
            return TtProbe::default();
        }

        self.hits += 1;

        if entry.depth >= depth {
            let usable = match entry.bound {
                Bound::Exact => true,
                Bound::Lower => entry.score >= beta,
                Bound::Upper => entry.score <= alpha,
            };
            if usable {
                return TtProbe { score: Some(entry.score), best_move: entry.best_move };
            }
        }

        TtProbe { score: None, best_move: entry.best_move }
    }

    /// Best move only, for move ordering at shallower nodes.
    pub fn best_move(&self, hash: u64) -> Option<(usize, usize)> {
        let entry = self.entries[self.slot(hash)]?;
        if entry.hash == hash {
            entry.best_move
        } else {
            None
        }
    }

    pub fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: i32,
        bound: Bound,
        best_move: Option<(usize, usize)>,
    ) {
        let slot = self.slot(hash);
        let replace = match &self.entries[slot] {
            None => true,
            Some(existing) => depth >= existing.depth || existing.age != self.age,
        };
        if replace {
            if self.entries[slot].is_none() {
                self.occupied += 1;
            }
            self.entries[slot] =
                Some(TtEntry { hash, depth, score, bound, best_move, age: self.age });
        }
    }

    /// Bulk eviction under fill pressure: drop entries from older searches
    /// first, then the shallowest of what remains.
    fn compact(&mut self) {
        let age = self.age;
        let mut removed = 0;
        for slot in self.entries.iter_mut() {
            if matches!(slot, Some(entry) if entry.age != age) {
                *slot = None;
                removed += 1;
            }
        }
        self.occupied -= removed;

        if self.occupied * 4 >= self.entries.len() * 3 {
            let mut depths: Vec<u32> = self
                .entries
                .iter()
                .filter_map(|slot| slot.map(|e| e.depth))
                .collect();
            depths.sort_unstable();
            let cutoff = depths[depths.len() / 4];
            let mut removed = 0;
            for slot in self.entries.iter_mut() {
                if matches!(slot, Some(entry) if entry.depth <= cutoff) {
                    *slot = None;
                    removed += 1;
                }
            }
            self.occupied -= removed;
        }

        log::debug!("transposition table compacted, {} entries left", self.occupied);
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|slot| *slot = None);
        self.age = 0;
        self.occupied = 0;
        self.hits = 0;
        self.misses = 0;
        self.collisions = 0;
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> (u64, u64, u64) {
        (self.hits, self.misses, self.collisions)
    }
}
