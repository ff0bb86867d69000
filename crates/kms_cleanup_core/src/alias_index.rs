use std::collections::BTreeSet;

use crate::contract::AliasEntry;

/// Identifiers of keys that had at least one alias bound when the alias
/// listing was read. Built fresh for every run and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasIndex {
    key_ids: BTreeSet<String>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a AliasEntry>) -> Self {
        let mut index = Self::new();
        index.extend(entries);
        index
    }

    /// Records the key an alias points at. Returns `false` when the alias is
    /// unbound or its key was already indexed.
    pub fn insert_entry(&mut self, entry: &AliasEntry) -> bool {
        match &entry.target_key_id {
            Some(key_id) => self.key_ids.insert(key_id.clone()),
            None => false,
        }
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.key_ids.contains(key_id)
    }

    pub fn len(&self) -> usize {
        self.key_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_ids.is_empty()
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.key_ids.iter().map(String::as_str)
    }
}

impl<'a> Extend<&'a AliasEntry> for AliasIndex {
    fn extend<T: IntoIterator<Item = &'a AliasEntry>>(&mut self, entries: T) {
        for entry in entries {
            self.insert_entry(entry);
        }
    }
}
