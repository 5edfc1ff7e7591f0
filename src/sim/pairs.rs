//! Per-tick set of candidate pairs

use std::collections::HashSet;

use super::body::EntityId;

/// Unordered id pairs, each kept once, in first-discovery order
#[derive(Debug, Clone, Default)]
pub struct PairSet {
    order: Vec<(EntityId, EntityId)>,
    seen: HashSet<(EntityId, EntityId)>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key a pair as (smaller id, larger id). Returns false if already present.
    pub fn insert(&mut self, a: EntityId, b: EntityId) -> bool {
        let key = if a < b { (a, b) } else { (b, a) };
        if self.seen.insert(key) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_directions_collapse() {
        let mut pairs = PairSet::new();
        assert!(pairs.insert(EntityId(3), EntityId(1)));
        assert!(!pairs.insert(EntityId(1), EntityId(3)));
        assert!(!pairs.insert(EntityId(3), EntityId(1)));
        assert!(pairs.insert(EntityId(1), EntityId(2)));

        let all: Vec<_> = pairs.iter().collect();
        assert_eq!(all, vec![(EntityId(1), EntityId(3)), (EntityId(1), EntityId(2))]);
    }

    #[test]
    fn test_clear() {
        let mut pairs = PairSet::new();
        pairs.insert(EntityId(0), EntityId(1));
        pairs.clear();
        assert!(pairs.is_empty());
        assert!(pairs.insert(EntityId(0), EntityId(1)));
    }
}
