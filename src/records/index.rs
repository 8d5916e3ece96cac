//! Ordered, keyed storage of item records.

use crate::types::StateSnapshot;
use indexmap::IndexMap;
use std::hash::Hash;

/// A stored item and its per-item flags.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemRecord<T, K> {
    pub value: T,
    pub selected: bool,
    /// Hidden from derived state and queries, but still stored.
    pub filtered: bool,
    pub key: K,
}

impl<T, K> ItemRecord<T, K> {
    fn new(key: K, value: T) -> Self {
        Self {
            value,
            selected: false,
            filtered: false,
            key,
        }
    }

    /// Borrowed view handed to predicates.
    pub fn view(&self) -> ItemView<'_, T, K> {
        ItemView {
            value: &self.value,
            key: &self.key,
            selected: self.selected,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.filtered
    }
}

/// What a predicate sees of an item.
#[derive(Debug)]
pub struct ItemView<'a, T, K> {
    pub value: &'a T,
    pub key: &'a K,
    pub selected: bool,
}

/// Item records keyed by their resolved key, in insertion order.
#[derive(Clone, Debug)]
pub struct ItemIndex<T, K> {
    records: IndexMap<K, ItemRecord<T, K>>,
}

impl<T, K> Default for ItemIndex<T, K> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }
}

impl<T: Clone, K: Clone + Eq + Hash> ItemIndex<T, K> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &K) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&ItemRecord<T, K>> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut ItemRecord<T, K>> {
        self.records.get_mut(key)
    }

    /// Insert a new unselected, visible record.
    ///
    /// No-op returning false if the key is already present.
    pub fn insert(&mut self, key: K, value: T) -> bool {
        if self.records.contains_key(&key) {
            return false;
        }
        self.records
            .insert(key.clone(), ItemRecord::new(key, value));
        true
    }

    /// Delete a record, keeping the order of the rest.
    pub fn delete(&mut self, key: &K) -> Option<ItemRecord<T, K>> {
        self.records.shift_remove(key)
    }

    /// Replace a record's value (and key) in place.
    ///
    /// Position and flags are kept. Returns the old record, or `None` if
    /// `old_key` is absent. The caller checks that `new_key` is free.
    pub fn replace(&mut self, old_key: &K, new_key: K, value: T) -> Option<ItemRecord<T, K>> {
        let (position, _, mut record) = self.records.shift_remove_full(old_key)?;
        let previous = record.clone();
        record.key = new_key.clone();
        record.value = value;
        self.records.shift_insert(position, new_key, record);
        Some(previous)
    }

    /// All records, including filtered ones.
    pub fn records(&self) -> impl Iterator<Item = &ItemRecord<T, K>> {
        self.records.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ItemRecord<T, K>> {
        self.records.values_mut()
    }

    /// Records not hidden by a filter.
    pub fn visible(&self) -> impl Iterator<Item = &ItemRecord<T, K>> {
        self.records.values().filter(|record| record.is_visible())
    }

    /// Keys of every stored record.
    pub fn keys(&self) -> Vec<K> {
        self.records.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Project the derived state.
    pub fn snapshot(&self) -> StateSnapshot<T> {
        let mut snapshot = StateSnapshot::default();
        for record in self.visible() {
            snapshot.items.push(record.value.clone());
            if record.selected {
                snapshot.selections.push(record.value.clone());
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(items: &[i32]) -> ItemIndex<i32, i32> {
        let mut index = ItemIndex::new();
        for item in items {
            index.insert(*item, *item);
        }
        index
    }

    #[test]
    fn test_insert_is_noop_on_existing_key() {
        let mut index = index_of(&[1, 2]);
        assert!(!index.insert(1, 10));
        assert_eq!(index.get(&1).unwrap().value, 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_delete_keeps_order() {
        let mut index = index_of(&[1, 2, 3, 4]);
        assert!(index.delete(&2).is_some());
        assert!(index.delete(&2).is_none());
        assert_eq!(index.snapshot().items, vec![1, 3, 4]);
    }

    #[test]
    fn test_replace_in_place() {
        let mut index = index_of(&[1, 2, 3]);
        index.get_mut(&2).unwrap().selected = true;

        let old = index.replace(&2, 20, 20).unwrap();
        assert_eq!(old.value, 2);
        assert!(!index.has(&2));

        let snapshot = index.snapshot();
        assert_eq!(snapshot.items, vec![1, 20, 3]);
        assert_eq!(snapshot.selections, vec![20]);
    }

    #[test]
    fn test_snapshot_skips_filtered() {
        let mut index = index_of(&[1, 2, 3]);
        index.get_mut(&1).unwrap().selected = true;
        index.get_mut(&3).unwrap().selected = true;
        index.get_mut(&3).unwrap().filtered = true;

        let snapshot = index.snapshot();
        assert_eq!(snapshot.items, vec![1, 2]);
        assert_eq!(snapshot.selections, vec![1]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.visible().count(), 2);
    }
}
