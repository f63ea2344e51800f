//! In-process sorted sets.
//!
//! Each set keeps a score map for O(1) lookups and a `BTreeSet` of
//! `(score, member)` for rank queries, so iteration order is exactly the
//! Redis order: score first, then member bytes.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use tally_store::RankedMember;

/// One sorted set.
#[derive(Debug, Default, Clone)]
pub struct SortedSet {
    scores: HashMap<String, u64>,
    order: BTreeSet<(u64, String)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `member` and return its new score.
    pub fn increment(&mut self, member: &str, delta: u64) -> u64 {
        let old = self.scores.get(member).copied();
        let new = old.unwrap_or(0).saturating_add(delta);
        if let Some(old) = old {
            if old == new {
                return new;
            }
            self.order.remove(&(old, member.to_string()));
        }
        self.scores.insert(member.to_string(), new);
        self.order.insert((new, member.to_string()));
        new
    }

    pub fn score(&self, member: &str) -> Option<u64> {
        self.scores.get(member).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn range_asc(&self, start: usize, stop: usize) -> Vec<RankedMember> {
        if start > stop {
            return Vec::new();
        }
        self.order
            .iter()
            .skip(start)
            .take((stop - start).saturating_add(1))
            .map(|(score, member)| RankedMember::new(member.clone(), *score))
            .collect()
    }

    pub fn range_desc(&self, start: usize, stop: usize) -> Vec<RankedMember> {
        if start > stop {
            return Vec::new();
        }
        self.order
            .iter()
            .rev()
            .skip(start)
            .take((stop - start).saturating_add(1))
            .map(|(score, member)| RankedMember::new(member.clone(), *score))
            .collect()
    }
}

/// Named sorted sets behind a single mutex.
///
/// Critical sections are a handful of map operations, so one lock is enough
/// for the number of sets a single election produces.
#[derive(Default)]
pub struct MemoryRankedSets {
    sets: Mutex<HashMap<String, SortedSet>>,
}

impl MemoryRankedSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_score(&self, set: &str, member: &str, delta: u64) -> u64 {
        let mut sets = self.sets.lock().unwrap_or_else(|e| e.into_inner());
        match sets.get_mut(set) {
            Some(existing) => existing.increment(member, delta),
            None => {
                let mut created = SortedSet::new();
                let score = created.increment(member, delta);
                sets.insert(set.to_string(), created);
                score
            }
        }
    }

    pub fn range_asc(&self, set: &str, start: usize, stop: usize) -> Vec<RankedMember> {
        self.sets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(set)
            .map(|s| s.range_asc(start, stop))
            .unwrap_or_default()
    }

    pub fn range_desc(&self, set: &str, start: usize, stop: usize) -> Vec<RankedMember> {
        self.sets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(set)
            .map(|s| s.range_desc(start, stop))
            .unwrap_or_default()
    }

    pub fn score(&self, set: &str, member: &str) -> Option<u64> {
        self.sets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(set)
            .and_then(|s| s.score(member))
    }

    pub fn set_count(&self) -> usize {
        self.sets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.sets.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(ranked: &[RankedMember]) -> Vec<&str> {
        ranked.iter().map(|r| r.member.as_str()).collect()
    }

    #[test]
    fn increment_creates_and_accumulates() {
        let mut set = SortedSet::new();
        assert_eq!(set.increment("a", 3), 3);
        assert_eq!(set.increment("a", 4), 7);
        assert_eq!(set.score("a"), Some(7));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn zero_delta_inserts_member_once() {
        let mut set = SortedSet::new();
        assert_eq!(set.increment("a", 0), 0);
        assert_eq!(set.increment("a", 0), 0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.range_asc(0, 0), vec![RankedMember::new("a", 0)]);
    }

    #[test]
    fn ties_follow_member_order() {
        let mut set = SortedSet::new();
        set.increment("c", 5);
        set.increment("b", 5);
        set.increment("a", 10);
        assert_eq!(members(&set.range_desc(0, 9)), vec!["a", "c", "b"]);
        assert_eq!(members(&set.range_asc(0, 9)), vec!["b", "c", "a"]);
    }

    #[test]
    fn ranges_are_inclusive_and_truncated() {
        let mut set = SortedSet::new();
        for (i, m) in ["a", "b", "c", "d"].iter().enumerate() {
            set.increment(m, i as u64);
        }
        assert_eq!(members(&set.range_asc(1, 2)), vec!["b", "c"]);
        assert_eq!(members(&set.range_desc(0, 0)), vec!["d"]);
        assert_eq!(set.range_desc(2, 100).len(), 2);
        assert!(set.range_asc(10, 20).is_empty());
        assert!(set.range_asc(3, 1).is_empty());
        assert_eq!(set.range_asc(0, usize::MAX).len(), 4);
        assert_eq!(set.range_desc(0, usize::MAX).len(), 4);
    }

    #[test]
    fn reordering_after_increment() {
        let sets = MemoryRankedSets::new();
        sets.increment_score("lb", "x", 1);
        sets.increment_score("lb", "y", 2);
        sets.increment_score("lb", "x", 5);
        assert_eq!(members(&sets.range_desc("lb", 0, 1)), vec!["x", "y"]);
        assert_eq!(sets.score("lb", "x"), Some(6));
    }

    #[test]
    fn missing_set_is_empty() {
        let sets = MemoryRankedSets::new();
        assert!(sets.range_desc("nope", 0, 10).is_empty());
        assert_eq!(sets.score("nope", "a"), None);
    }

    #[test]
    fn clear_drops_all_sets() {
        let sets = MemoryRankedSets::new();
        sets.increment_score("a", "m", 1);
        sets.increment_score("b", "m", 1);
        assert_eq!(sets.set_count(), 2);
        sets.clear();
        assert_eq!(sets.set_count(), 0);
    }
}
