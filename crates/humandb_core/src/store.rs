//! The collection store.
//!
//! An insertion-ordered map from client-chosen key to record. The store is
//! not synchronized; callers share it behind a lock and hold that lock for
//! the whole of any read-then-write sequence (id generation followed by an
//! insert in particular).

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::model::{now, HumanBeing, DATE_FORMAT};

/// Label reported by [`CollectionStore::info`].
pub const STORE_KIND: &str = "IndexMap<i32, HumanBeing>";

/// Summary returned by [`CollectionStore::info`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreInfo {
    /// Kind of the underlying container.
    pub kind: &'static str,
    /// When the store was created.
    pub initialized_at: NaiveDateTime,
    /// Number of entries.
    pub len: usize,
}

impl fmt::Display for StoreInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Collection type: {}\nInitialization date: {}\nNumber of elements: {}",
            self.kind,
            self.initialized_at.format(DATE_FORMAT),
            self.len
        )
    }
}

/// Why an entry was dropped while loading a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The id is zero or negative.
    NonPositiveId(i32),
    /// Another entry already carries this id.
    DuplicateId(i32),
    /// Another entry already uses this key.
    DuplicateKey,
    /// The name is empty.
    EmptyName,
    /// The soundtrack name is empty.
    EmptySoundtrack,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NonPositiveId(id) => write!(f, "id {id} is not positive"),
            Rejection::DuplicateId(id) => write!(f, "id {id} is used more than once"),
            Rejection::DuplicateKey => f.write_str("key is used more than once"),
            Rejection::EmptyName => f.write_str("name is empty"),
            Rejection::EmptySoundtrack => f.write_str("soundtrack name is empty"),
        }
    }
}

/// Filter loaded entries down to the ones the store invariants allow.
///
/// Keeps the first occurrence of each key and id; returns the surviving map
/// and the dropped keys with their reasons.
pub fn validate_entries<I>(entries: I) -> (IndexMap<i32, HumanBeing>, Vec<(i32, Rejection)>)
where
    I: IntoIterator<Item = (i32, HumanBeing)>,
{
    let mut kept = IndexMap::new();
    let mut rejected = Vec::new();
    let mut ids = HashSet::new();

    for (key, record) in entries {
        let problem = if kept.contains_key(&key) {
            Some(Rejection::DuplicateKey)
        } else if record.id <= 0 {
            Some(Rejection::NonPositiveId(record.id))
        } else if ids.contains(&record.id) {
            Some(Rejection::DuplicateId(record.id))
        } else if record.name.is_empty() {
            Some(Rejection::EmptyName)
        } else if record.soundtrack_name.is_empty() {
            Some(Rejection::EmptySoundtrack)
        } else {
            None
        };

        match problem {
            Some(reason) => rejected.push((key, reason)),
            None => {
                ids.insert(record.id);
                kept.insert(key, record);
            }
        }
    }

    (kept, rejected)
}

/// Key to record map with id generation and ordering projections.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    entries: IndexMap<i32, HumanBeing>,
    initialized_at: NaiveDateTime,
}

impl CollectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            initialized_at: now(),
        }
    }

    /// Build a store from loaded entries, dropping invalid ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, HumanBeing)>,
    {
        let (kept, rejected) = validate_entries(entries);
        for (key, reason) in &rejected {
            warn!(key, %reason, "dropping invalid entry");
        }
        Self {
            entries: kept,
            initialized_at: now(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &HumanBeing)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Owned copy of every entry in insertion order.
    pub fn entries(&self) -> Vec<(i32, HumanBeing)> {
        self.entries.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    /// Insert `record` at `key`, stamping its creation date.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if `key` is present.
    pub fn add(&mut self, key: i32, mut record: HumanBeing) -> CoreResult<()> {
        if self.entries.contains_key(&key) {
            return Err(CoreError::DuplicateKey(key));
        }
        record.creation_date = now();
        self.entries.insert(key, record);
        Ok(())
    }

    /// Remove the entry at `key`, keeping the order of the others.
    pub fn remove(&mut self, key: i32) -> Option<HumanBeing> {
        self.entries.shift_remove(&key)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove every entry whose record sorts strictly before `record`.
    ///
    /// Returns the number of removed entries.
    pub fn remove_lower(&mut self, record: &HumanBeing) -> usize {
        self.retain_counting(|_, v| !v.is_lower_than(record))
    }

    /// Remove every entry whose key is strictly greater than `key`.
    pub fn remove_greater_key(&mut self, key: i32) -> usize {
        self.retain_counting(|k, _| k <= key)
    }

    /// Remove every entry whose key is strictly less than `key`.
    pub fn remove_lower_key(&mut self, key: i32) -> usize {
        self.retain_counting(|k, _| k >= key)
    }

    fn retain_counting<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(i32, &HumanBeing) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|k, v| keep(*k, v));
        before - self.entries.len()
    }

    /// Move the record carrying `record.id` to `key`, replacing its contents.
    ///
    /// The old entry is removed and the new one appended with a fresh
    /// creation date, so the storage key of a record may change here.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownId`] if no record has `record.id`, or
    /// [`CoreError::KeyInUse`] if `key` holds a different record.
    pub fn update(&mut self, key: i32, mut record: HumanBeing) -> CoreResult<()> {
        let old_key = self
            .key_by_id(record.id)
            .ok_or(CoreError::UnknownId(record.id))?;
        if old_key != key && self.entries.contains_key(&key) {
            return Err(CoreError::KeyInUse { key });
        }
        self.entries.shift_remove(&old_key);
        record.creation_date = now();
        self.entries.insert(key, record);
        Ok(())
    }

    /// Smallest positive integer not used as any record's id.
    pub fn generate_id(&self) -> i32 {
        let used: HashSet<i32> = self.entries.values().map(|r| r.id).collect();
        (1..=i32::MAX).find(|id| !used.contains(id)).unwrap_or(i32::MAX)
    }

    /// Record carrying `id`.
    pub fn by_id(&self, id: i32) -> Option<&HumanBeing> {
        self.entries.values().find(|r| r.id == id)
    }

    /// Returns true if some record carries `id`.
    pub fn contains_id(&self, id: i32) -> bool {
        self.by_id(id).is_some()
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: i32) -> bool {
        self.entries.contains_key(&key)
    }

    /// Record stored at `key`.
    pub fn by_key(&self, key: i32) -> Option<&HumanBeing> {
        self.entries.get(&key)
    }

    /// Key under which the record carrying `id` is stored.
    pub fn key_by_id(&self, id: i32) -> Option<i32> {
        self.entries
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(k, _)| *k)
    }

    /// Entries ordered by name, ascending. Ties keep insertion order.
    pub fn sorted_ascending(&self) -> Vec<(i32, HumanBeing)> {
        let mut out = self.entries();
        out.sort_by(|a, b| a.1.cmp_by_name(&b.1));
        out
    }

    /// Entries ordered by name, descending. Ties keep insertion order.
    pub fn sorted_descending(&self) -> Vec<(i32, HumanBeing)> {
        let mut out = self.entries();
        out.sort_by(|a, b| b.1.cmp_by_name(&a.1));
        out
    }

    /// Entries ordered by car name, descending.
    pub fn sorted_by_car_name_descending(&self) -> Vec<(i32, HumanBeing)> {
        let mut out = self.entries();
        out.sort_by(|a, b| b.1.car.name.cmp(&a.1.car.name));
        out
    }

    /// Kind, initialization time and size.
    pub fn info(&self) -> StoreInfo {
        StoreInfo {
            kind: STORE_KIND,
            initialized_at: self.initialized_at,
            len: self.entries.len(),
        }
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}
