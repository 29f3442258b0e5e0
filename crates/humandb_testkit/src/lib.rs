//! # humandb testkit
//!
//! Test utilities shared by the humandb crates.
//!
//! This crate provides:
//! - Sample records, populated stores and temporary snapshot files
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use humandb_testkit::prelude::*;
//!
//! let store = populated_store(3);
//! assert_eq!(store.len(), 3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
