//! Moments Core Library
//!
//! This crate provides the core functionality for Moments, a single-user
//! journal of dated entries with photos and a mood score.
//!
//! # Architecture
//!
//! - **Store**: ordered in-memory list, saved as one JSON blob in a
//!   key-value slot after every change
//! - **Export**: pure layout plus PDF serialization, run on a blocking
//!   worker over a snapshot
//!
//! # Quick Start
//!
//! ```text
//! let mut store = MomentStore::open(&config)?;
//!
//! // Record a moment
//! store.add("Sunny day", Vec::new(), 0.8);
//!
//! // Export everything, newest first
//! let document = Exporter::from_config(&config).export(&store.newest_first());
//! ```
//!
//! # Modules
//!
//! - `store`: the record store (main entry point)
//! - `models`: the `Moment` type
//! - `codec`: blob encoding
//! - `storage`: key-value slot backends
//! - `export`: PDF rendering and hand-off
//! - `config`: application configuration

pub mod codec;
pub mod config;
pub mod export;
pub mod models;
pub mod storage;
pub mod store;

pub use config::Config;
pub use export::{write_export, ExportError, ExportTask, ExportedDocument, Exporter};
pub use models::Moment;
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};
pub use store::MomentStore;
