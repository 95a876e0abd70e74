//! Storage layer
//!
//! The moment list is persisted as a single blob in a key-value slot.
//!
//! ## Backends
//!
//! - **File**: one file per key in the data directory, written atomically
//! - **Memory**: process-local map, used in tests
//!
//! The store encodes and decodes the blob; backends only move bytes.

pub mod error;
pub mod memory;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryKeyValueStore;
pub use persistence::{FileKeyValueStore, KeyValueStore};
