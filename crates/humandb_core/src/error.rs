//! Error types for humandb core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the record model and collection store.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error while reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A snapshot row could not be parsed.
    #[error("snapshot line {line}: {message}")]
    Snapshot {
        /// 1-based line number in the snapshot file.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A weapon type name is not one of the known variants.
    #[error("unknown weapon type {0:?}")]
    UnknownWeaponType(String),

    /// The key is already present in the store.
    #[error("key {0} is already present")]
    DuplicateKey(i32),

    /// The key is held by a record other than the one being updated.
    #[error("key {key} is held by another record")]
    KeyInUse {
        /// The contested key.
        key: i32,
    },

    /// No record carries the given id.
    #[error("no record with id {0}")]
    UnknownId(i32),
}

impl CoreError {
    /// Create a snapshot parse error.
    pub fn snapshot(line: usize, message: impl Into<String>) -> Self {
        Self::Snapshot {
            line,
            message: message.into(),
        }
    }
}
