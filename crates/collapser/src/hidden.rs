//! HiddenSet - element → active selector
//!
//! At most one record per element. Keys are copyable node handles, so a
//! record never keeps its element alive.

use std::hash::Hash;

use dashmap::DashMap;

/// The rule currently hiding one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenRecord<N> {
    /// Selector text of the active rule, before context prefixing
    pub selector: String,
    /// Context the rule was installed in
    pub context: Option<N>,
}

/// Tracked hidden elements
pub struct HiddenSet<N: Eq + Hash> {
    records: DashMap<N, HiddenRecord<N>>,
}

impl<N: Copy + Eq + Hash> HiddenSet<N> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn get(&self, element: N) -> Option<HiddenRecord<N>> {
        self.records.get(&element).map(|r| r.value().clone())
    }

    /// Upsert, returning the record that was replaced
    pub fn insert(&self, element: N, record: HiddenRecord<N>) -> Option<HiddenRecord<N>> {
        self.records.insert(element, record)
    }

    pub fn remove(&self, element: N) -> Option<HiddenRecord<N>> {
        self.records.remove(&element).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove and return every record whose element satisfies `evict`
    pub fn drain_where<F>(&self, mut evict: F) -> Vec<(N, HiddenRecord<N>)>
    where
        F: FnMut(N) -> bool,
    {
        let doomed: Vec<N> = self
            .records
            .iter()
            .map(|entry| *entry.key())
            .filter(|&element| evict(element))
            .collect();

        doomed
            .into_iter()
            .filter_map(|element| self.records.remove(&element))
            .collect()
    }
}

impl<N: Copy + Eq + Hash> Default for HiddenSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(selector: &str) -> HiddenRecord<u32> {
        HiddenRecord {
            selector: selector.to_string(),
            context: None,
        }
    }

    #[test]
    fn test_upsert_returns_previous() {
        let set = HiddenSet::new();
        assert_eq!(set.insert(7, record("a")), None);
        assert_eq!(set.insert(7, record("b")), Some(record("a")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(7), Some(record("b")));
    }

    #[test]
    fn test_remove() {
        let set = HiddenSet::new();
        set.insert(1, record("a"));
        assert_eq!(set.remove(1), Some(record("a")));
        assert_eq!(set.remove(1), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_drain_where() {
        let set = HiddenSet::new();
        for id in 0..6u32 {
            set.insert(id, record(&format!("s{}", id)));
        }

        let mut drained = set.drain_where(|id| id % 2 == 0);
        drained.sort_by_key(|(id, _)| *id);
        let ids: Vec<u32> = drained.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 2, 4]);
        assert_eq!(set.len(), 3);
        assert!(set.get(1).is_some());
    }
}
