//! # humandb core
//!
//! The record model and the collection store shared by the server and the
//! protocol layer.
//!
//! - [`HumanBeing`] and its parts, ordered by name case-insensitively
//! - [`CollectionStore`], an insertion-ordered key to record map with id
//!   generation, filtered removals and sorted projections
//! - [`snapshot`], the tab-separated file the server loads at startup and
//!   writes on `save`
//!
//! ```
//! use humandb_core::CollectionStore;
//!
//! let store = CollectionStore::new();
//! assert_eq!(store.generate_id(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod model;
pub mod snapshot;
mod store;

pub use error::{CoreError, CoreResult};
pub use model::{now, Car, Coordinates, HumanBeing, WeaponType, DATE_FORMAT};
pub use store::{validate_entries, CollectionStore, Rejection, StoreInfo, STORE_KIND};
