//! Insertion-ordered item store.
//!
//! The corpus is the raw material for every index rebuild. It supports the
//! two mutations the sync feed needs: a full replacement and a per-key
//! upsert. An upsert of an existing key overwrites the record in place, so
//! the stored order is the order in which keys were first seen.

use std::collections::HashMap;

use crate::types::{ItemKey, ItemRecord};

/// Items keyed by [`ItemKey`], iterated in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    items: Vec<ItemRecord>,
    positions: HashMap<ItemKey, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from records; duplicate keys collapse, last write wins
    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let mut corpus = Self::new();
        corpus.upsert_many(records);
        corpus
    }

    /// Insert a record or overwrite the record with the same key.
    ///
    /// Returns `true` when the key was not present before.
    pub fn upsert(&mut self, record: ItemRecord) -> bool {
        let record = record.normalized();
        let key = record.key();
        match self.positions.get(&key) {
            Some(&pos) => {
                self.items[pos] = record;
                false
            }
            None => {
                self.positions.insert(key, self.items.len());
                self.items.push(record);
                true
            }
        }
    }

    /// Upsert every record in order. Returns how many keys were new.
    pub fn upsert_many(&mut self, records: impl IntoIterator<Item = ItemRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.upsert(record) {
                added += 1;
            }
        }
        added
    }

    /// Drop everything, then upsert `records`
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = ItemRecord>) {
        self.clear();
        self.upsert_many(records);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    pub fn get(&self, key: &ItemKey) -> Option<&ItemRecord> {
        self.positions.get(key).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records in stored order
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ItemRecord] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemType;

    fn record(id: i64, item_type: ItemType, title: &str) -> ItemRecord {
        ItemRecord::new(id, item_type, title, &["Drama"])
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let mut corpus = Corpus::new();
        assert!(corpus.upsert(record(1, ItemType::Movie, "Old Title")));
        assert!(!corpus.upsert(record(1, ItemType::Movie, "New Title")));

        assert_eq!(corpus.len(), 1);
        let key = ItemKey::new(ItemType::Movie, 1);
        assert_eq!(corpus.get(&key).unwrap().title, "New Title");
    }

    #[test]
    fn test_upsert_keeps_first_seen_position() {
        let mut corpus = Corpus::new();
        corpus.upsert(record(1, ItemType::Movie, "A"));
        corpus.upsert(record(2, ItemType::Movie, "B"));
        corpus.upsert(record(1, ItemType::Movie, "A2"));

        let titles: Vec<&str> = corpus.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A2", "B"]);
    }

    #[test]
    fn test_type_is_part_of_identity() {
        let corpus = Corpus::from_records(vec![
            record(1, ItemType::Movie, "Movie One"),
            record(1, ItemType::Book, "Book One"),
        ]);
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_replace_all() {
        let mut corpus = Corpus::from_records(vec![record(1, ItemType::Movie, "A")]);
        corpus.replace_all(vec![record(7, ItemType::Series, "S"), record(8, ItemType::Book, "B")]);

        assert_eq!(corpus.len(), 2);
        assert!(!corpus.contains(&ItemKey::new(ItemType::Movie, 1)));
        assert!(corpus.contains(&ItemKey::new(ItemType::Series, 7)));
    }

    #[test]
    fn test_upsert_many_counts_new_keys() {
        let mut corpus = Corpus::new();
        let added = corpus.upsert_many(vec![
            record(1, ItemType::Movie, "A"),
            record(1, ItemType::Movie, "A again"),
            record(2, ItemType::Movie, "B"),
        ]);
        assert_eq!(added, 2);
    }

    #[test]
    fn test_empty_queries() {
        let corpus = Corpus::new();
        assert!(corpus.is_empty());
        assert!(corpus.get(&ItemKey::new(ItemType::Book, 999)).is_none());
    }
}
