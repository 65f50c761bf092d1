use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::board::Stone;
use crate::threats::types::ThreatResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheInner {
    threats: HashMap<(u64, Stone), ThreatResult>,
    scores: HashMap<(u64, Stone), i32>,
    stats: CacheStats,
}

/// Hashed memo for threat results and move scores, keyed by Zobrist hash and
/// stone color. Insert and evict paths run under one lock; readers take the
/// same lock for a single lookup, so the cache may be shared across threads.
pub struct EvalCache {
    max_entries: usize,
    inner: Mutex<CacheInner>,
}

impl EvalCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            inner: Mutex::new(CacheInner {
                threats: HashMap::new(),
                scores: HashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn get_threats(&self, hash: u64, stone: Stone) -> Option<ThreatResult> {
        let mut inner = self.inner.lock().unwrap();
        match inner.threats.get(&(hash, stone)).cloned() {
            Some(result) => {
                inner.stats.hits += 1;
                Some(result)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn put_threats(&self, hash: u64, stone: Stone, result: ThreatResult) {
        let mut inner = self.inner.lock().unwrap();
        if inner.threats.len() >= self.max_entries {
            Self::evict_quarter(&mut inner.threats);
        }
        inner.threats.insert((hash, stone), result);
    }

    pub fn get_score(&self, hash: u64, stone: Stone) -> Option<i32> {
        let mut inner = self.inner.lock().unwrap();
        match inner.scores.get(&(hash, stone)).copied() {
            Some(score) => {
                inner.stats.hits += 1;
                Some(score)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn put_score(&self, hash: u64, stone: Stone, score: i32) {
        let mut inner = self.inner.lock().unwrap();
        if inner.scores.len() >= self.max_entries {
            Self::evict_quarter(&mut inner.scores);
        }
        inner.scores.insert((hash, stone), score);
    }

    /// Drop roughly a quarter of the entries when full.
    fn evict_quarter<V>(map: &mut HashMap<(u64, Stone), V>) {
        let to_remove: Vec<(u64, Stone)> = map.keys().take(map.len() / 4).copied().collect();
        for key in to_remove {
            map.remove(&key);
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.threats.clear();
        inner.scores.clear();
        inner.stats = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().unwrap().stats
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.threats.len() + inner.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EvalCache {
    fn default() -> Self {
        Self::new(100_000)
    }
}
