use std::collections::HashMap;

use crate::types::AnimalIndex;

/// Canonical key for a symmetric pair: smaller index first.
#[inline]
pub(crate) fn pair_key(a: AnimalIndex, b: AnimalIndex) -> (AnimalIndex, AnimalIndex) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Counters describing the work done by one top-level query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Inbreeding coefficients evaluated (cache misses on F).
    pub inbreeding_evaluations: usize,
    /// Relationship coefficients evaluated (cache misses on R).
    pub relationship_evaluations: usize,
    /// Lookups answered from the cache.
    pub cache_hits: usize,
}

/// Memo table for F and R values, scoped to a single top-level query.
///
/// R is symmetric, so relationship entries are stored under the sorted pair:
/// `R(a, b)` and `R(b, a)` share one slot.
#[derive(Debug, Default)]
pub struct ComputationCache {
    inbreeding: HashMap<AnimalIndex, f64>,
    relationship: HashMap<(AnimalIndex, AnimalIndex), f64>,
    stats: QueryStats,
}

impl ComputationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inbreeding(&mut self, x: AnimalIndex) -> Option<f64> {
        let hit = self.inbreeding.get(&x).copied();
        if hit.is_some() {
            self.stats.cache_hits += 1;
        }
        hit
    }

    pub fn store_inbreeding(&mut self, x: AnimalIndex, value: f64) {
        self.stats.inbreeding_evaluations += 1;
        self.inbreeding.insert(x, value);
    }

    /// Count an F evaluation whose value must not be memoized.
    pub fn skip_inbreeding(&mut self) {
        self.stats.inbreeding_evaluations += 1;
    }

    pub fn relationship(&mut self, x: AnimalIndex, y: AnimalIndex) -> Option<f64> {
        let hit = self.relationship.get(&pair_key(x, y)).copied();
        if hit.is_some() {
            self.stats.cache_hits += 1;
        }
        hit
    }

    pub fn store_relationship(&mut self, x: AnimalIndex, y: AnimalIndex, value: f64) {
        self.stats.relationship_evaluations += 1;
        self.relationship.insert(pair_key(x, y), value);
    }

    /// Count an R evaluation whose value must not be memoized.
    pub fn skip_relationship(&mut self) {
        self.stats.relationship_evaluations += 1;
    }

    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// Number of distinct F and R entries held.
    pub fn len(&self) -> usize {
        self.inbreeding.len() + self.relationship.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_key_is_unordered() {
        let mut cache = ComputationCache::new();
        assert_eq!(cache.relationship(3, 7), None);

        cache.store_relationship(7, 3, 0.25);
        assert_eq!(cache.relationship(3, 7), Some(0.25));
        assert_eq!(cache.relationship(7, 3), Some(0.25));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.relationship_evaluations, 1);
        assert_eq!(stats.cache_hits, 2);
    }

    #[test]
    fn test_inbreeding_entries() {
        let mut cache = ComputationCache::new();
        assert!(cache.is_empty());
        cache.store_inbreeding(4, 0.125);
        assert_eq!(cache.inbreeding(4), Some(0.125));
        assert_eq!(cache.inbreeding(5), None);
        assert_eq!(cache.stats().inbreeding_evaluations, 1);
    }

    #[test]
    fn test_pair_key() {
        assert_eq!(pair_key(2, 1), (1, 2));
        assert_eq!(pair_key(1, 2), (1, 2));
        assert_eq!(pair_key(5, 5), (5, 5));
    }
}
