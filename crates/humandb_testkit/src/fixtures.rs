//! Test fixtures: sample records, stores and snapshot files.

use std::path::{Path, PathBuf};

use humandb_core::snapshot::write_snapshot;
use humandb_core::{now, Car, Coordinates, CollectionStore, HumanBeing, WeaponType};
use tempfile::TempDir;

/// Builds a complete record with the given id and name.
///
/// Every other field gets a fixed value derived from `id`, so two calls with
/// the same arguments differ only in `creation_date`.
pub fn sample_record(id: i32, name: &str) -> HumanBeing {
    let weapon = WeaponType::ALL[id.unsigned_abs() as usize % WeaponType::ALL.len()];
    HumanBeing {
        id,
        name: name.to_string(),
        coordinates: Coordinates {
            x: f64::from(id) * 1.5,
            y: i64::from(id) * -2,
        },
        creation_date: now(),
        real_hero: id % 2 == 0,
        has_toothpick: id % 3 == 0,
        impact_speed: i64::from(id) * 10,
        soundtrack_name: format!("track {id}"),
        minutes_of_waiting: f64::from(id) / 4.0,
        weapon_type: weapon,
        car: Car {
            name: format!("car {}", (b'a' + (id.unsigned_abs() % 26) as u8) as char),
            cool: id % 2 == 1,
        },
    }
}

/// Names handed out by [`sample_entries`], deliberately not in key order.
pub const SAMPLE_NAMES: [&str; 8] = [
    "Mira", "alex", "Zed", "bruno", "Kim", "yara", "Leo", "dana",
];

/// `count` entries keyed 10, 20, 30, ... with ids 1, 2, 3, ...
pub fn sample_entries(count: usize) -> Vec<(i32, HumanBeing)> {
    (1..=count)
        .map(|i| {
            let id = i32::try_from(i).expect("sample count fits in i32");
            let name = SAMPLE_NAMES[(i - 1) % SAMPLE_NAMES.len()];
            (id * 10, sample_record(id, name))
        })
        .collect()
}

/// A store holding [`sample_entries`]`(count)`.
pub fn populated_store(count: usize) -> CollectionStore {
    CollectionStore::from_entries(sample_entries(count))
}

/// A snapshot path inside a temporary directory that lives as long as this
/// value.
pub struct TempSnapshot {
    path: PathBuf,
    _dir: TempDir,
}

impl TempSnapshot {
    /// A path where no file exists yet.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("collection.tsv");
        Self { path, _dir: dir }
    }

    /// A snapshot file holding the given entries.
    pub fn with_entries(entries: &[(i32, HumanBeing)]) -> Self {
        let snapshot = Self::empty();
        write_snapshot(&snapshot.path, entries.iter().map(|(k, r)| (*k, r)))
            .expect("Failed to write snapshot");
        snapshot
    }

    /// A snapshot file with raw contents.
    pub fn with_contents(contents: &str) -> Self {
        let snapshot = Self::empty();
        std::fs::write(&snapshot.path, contents).expect("Failed to write snapshot");
        snapshot
    }

    /// Snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_entries_are_valid() {
        let entries = sample_entries(12);
        let store = CollectionStore::from_entries(entries.clone());
        assert_eq!(store.len(), 12);
        assert_eq!(entries[0].0, 10);
        assert_eq!(entries[11].1.id, 12);
    }

    #[test]
    fn temp_snapshot_loads_back() {
        let snapshot = TempSnapshot::with_entries(&sample_entries(3));
        let store = CollectionStore::load(snapshot.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert!(!TempSnapshot::empty().path().exists());
    }
}
