//! Moment store
//!
//! The `MomentStore` owns the ordered list of moments and keeps a durable
//! copy in a key-value slot. Every mutation is applied to memory first and
//! then saved; a failed save is logged and never rolls the change back.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = MomentStore::open(&config)?;  // Loads existing data
//!
//! let moment = store.add("Sunny day", Vec::new(), 0.8);
//! let newest = store.newest_first();
//! ```
//!
//! The store is single-threaded: mutations take `&mut self`. Observers call
//! `subscribe()` and watch the revision counter instead of holding a live
//! reference.

use std::collections::HashSet;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec;
use crate::config::Config;
use crate::models::Moment;
use crate::storage::{FileKeyValueStore, KeyValueStore, StorageError, StorageResult};

/// Ordered collection of moments backed by a key-value slot
pub struct MomentStore {
    /// Moments in insertion order
    moments: Vec<Moment>,
    /// Durable slot
    backend: Box<dyn KeyValueStore>,
    /// Key the list is stored under
    key: String,
    /// Bumped after every change to `moments`
    revision: watch::Sender<u64>,
}

impl MomentStore {
    /// Create an empty store over `backend` without loading anything
    pub fn new(backend: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            moments: Vec::new(),
            backend: Box::new(backend),
            key: key.into(),
            revision,
        }
    }

    /// Open the file-backed store described by `config` and load it
    ///
    /// Malformed stored data is logged and the store starts empty; only
    /// read errors abort.
    pub fn open(config: &Config) -> Result<Self> {
        let backend = FileKeyValueStore::new(&config.data_dir);
        let mut store = Self::new(backend, config.store_key.clone());

        match store.load() {
            Ok(count) => {
                info!("Loaded {} moments from {:?}", count, config.store_path());
                Ok(store)
            }
            Err(e @ StorageError::Decode { .. }) => {
                warn!("Starting with an empty journal: {}", e);
                Ok(store)
            }
            Err(e) => Err(e).context("Failed to load moments"),
        }
    }

    // ==================== Mutations ====================

    /// Record a new moment stamped with the current time
    pub fn add(
        &mut self,
        description: impl Into<String>,
        images: Vec<Vec<u8>>,
        emotion: f64,
    ) -> Moment {
        let moment = Moment::new(description, images, emotion);
        debug!("Adding moment {}", moment.id);
        self.moments.push(moment.clone());
        self.changed();
        moment
    }

    /// Replace the content of the moment with the same id
    ///
    /// Position, `id` and `timestamp` of the stored moment are kept. Returns
    /// `false` and leaves the store untouched when no moment has that id.
    pub fn update(&mut self, moment: &Moment) -> bool {
        let Some(existing) = self.moments.iter_mut().find(|m| m.id == moment.id) else {
            debug!("Ignoring update for unknown moment {}", moment.id);
            return false;
        };

        existing.replace_content(moment);
        self.changed();
        true
    }

    /// Remove every moment whose id is in `ids`
    ///
    /// Returns the number removed. Unknown ids are ignored.
    pub fn delete_matching(&mut self, ids: &HashSet<Uuid>) -> usize {
        let before = self.moments.len();
        self.moments.retain(|m| !ids.contains(&m.id));
        let removed = before - self.moments.len();

        debug!("Deleted {} of {} requested moments", removed, ids.len());
        self.changed();
        removed
    }

    // ==================== Persistence ====================

    /// Replace the in-memory list with the stored one
    ///
    /// Missing data leaves the list untouched and returns `Ok(0)`. Malformed
    /// data also leaves the list untouched; the raw blob is copied aside
    /// under `<key>.corrupt` before the error is returned, so a later save
    /// does not destroy it.
    pub fn load(&mut self) -> StorageResult<usize> {
        let Some(bytes) = self.backend.get(&self.key)? else {
            debug!("No stored moments under '{}'", self.key);
            return Ok(0);
        };

        match codec::decode(&bytes) {
            Ok(moments) => {
                self.moments = moments;
                self.revision.send_modify(|rev| *rev += 1);
                Ok(self.moments.len())
            }
            Err(source) => {
                let backup = format!("{}.corrupt", self.key);
                let backup_key = match self.backend.set(&backup, &bytes) {
                    Ok(()) => Some(backup),
                    Err(e) => {
                        warn!("Could not keep a copy of unreadable moments: {}", e);
                        None
                    }
                };
                let err = StorageError::Decode {
                    key: self.key.clone(),
                    backup_key,
                    source,
                };
                warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Write the full list to the slot
    pub fn save(&self) -> StorageResult<()> {
        let bytes = codec::encode(&self.moments).map_err(|source| StorageError::Encode {
            key: self.key.clone(),
            source,
        })?;
        self.backend.set(&self.key, &bytes)
    }

    /// Notify observers and save, logging a failed save
    fn changed(&mut self) {
        self.revision.send_modify(|rev| *rev += 1);
        if let Err(e) = self.save() {
            warn!("Failed to save moments: {}", e);
            if let Some(hint) = e.recovery_suggestion() {
                warn!("{}", hint);
            }
        }
    }

    // ==================== Queries ====================

    /// All moments in insertion order
    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// All moments, newest first
    pub fn newest_first(&self) -> Vec<Moment> {
        let mut sorted = self.moments.clone();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
    }

    /// Owned copy of the list for work that outlives this borrow
    pub fn snapshot(&self) -> Vec<Moment> {
        self.moments.clone()
    }

    /// Get a moment by ID
    pub fn get(&self, id: Uuid) -> Option<&Moment> {
        self.moments.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Watch the revision counter; it increases after every change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use chrono::Utc;
    use tempfile::TempDir;

    fn memory_store() -> (MomentStore, MemoryKeyValueStore) {
        let kv = MemoryKeyValueStore::new();
        (MomentStore::new(kv.clone(), "moments"), kv)
    }

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_add_increases_count_by_one() {
        let (mut store, _) = memory_store();
        store.add("existing", Vec::new(), 0.1);
        let before_len = store.len();
        let before = Utc::now();

        let moment = store.add("Sunny day", vec![vec![1, 2]], 0.8);

        assert_eq!(store.len(), before_len + 1);
        let stored = store.get(moment.id).unwrap();
        assert_eq!(stored.description, "Sunny day");
        assert_eq!(stored.images, vec![vec![1, 2]]);
        assert_eq!(stored.emotion, 0.8);
        assert!(stored.timestamp >= before);
        assert_eq!(store.moments().iter().filter(|m| m.id == moment.id).count(), 1);
    }

    #[test]
    fn test_add_saves() {
        let (mut store, kv) = memory_store();
        let moment = store.add("Saved", Vec::new(), 0.5);

        let blob = kv.get("moments").unwrap().unwrap();
        let decoded = codec::decode(&blob).unwrap();
        assert_eq!(decoded, vec![moment]);
    }

    #[test]
    fn test_add_survives_save_failure() {
        let (mut store, kv) = memory_store();
        kv.set_simulate_write_error(true);

        let moment = store.add("Not persisted", Vec::new(), 0.5);

        assert_eq!(store.len(), 1);
        assert!(store.get(moment.id).is_some());
        assert!(kv.get("moments").unwrap().is_none());
        assert!(store.save().is_err());
    }

    #[test]
    fn test_update_replaces_content_only() {
        let (mut store, _) = memory_store();
        let first = store.add("first", Vec::new(), 0.1);
        let second = store.add("second", vec![vec![9]], 0.2);
        let third = store.add("third", Vec::new(), 0.3);

        let mut edited = Moment::new("second, edited", Vec::new(), 0.95);
        edited.id = second.id;

        assert!(store.update(&edited));

        let moments = store.moments();
        assert_eq!(moments.len(), 3);
        assert_eq!(moments[0], first);
        assert_eq!(moments[2], third);

        let updated = &moments[1];
        assert_eq!(updated.id, second.id);
        assert_eq!(updated.timestamp, second.timestamp);
        assert_eq!(updated.description, "second, edited");
        assert!(updated.images.is_empty());
        assert_eq!(updated.emotion, 0.95);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (mut store, kv) = memory_store();
        store.add("only", Vec::new(), 0.5);
        let before = store.snapshot();
        let blob_before = kv.get("moments").unwrap();
        let revision = store.revision();

        let stranger = Moment::new("stranger", Vec::new(), 0.0);
        assert!(!store.update(&stranger));

        assert_eq!(store.moments(), before.as_slice());
        assert_eq!(kv.get("moments").unwrap(), blob_before);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_delete_matching_removes_exact_subset() {
        let (mut store, _) = memory_store();
        let ids: Vec<Uuid> = (0..5)
            .map(|i| store.add(format!("moment {}", i), Vec::new(), 0.5).id)
            .collect();

        let doomed: HashSet<Uuid> = [ids[1], ids[3], Uuid::new_v4()].into_iter().collect();
        let removed = store.delete_matching(&doomed);

        assert_eq!(removed, 2);
        let remaining: Vec<Uuid> = store.moments().iter().map(|m| m.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn test_delete_unknown_ids() {
        let (mut store, _) = memory_store();
        store.add("keep", Vec::new(), 0.5);

        let removed = store.delete_matching(&[Uuid::new_v4()].into_iter().collect());
        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing_leaves_list_untouched() {
        let (mut store, _) = memory_store();
        assert_eq!(store.load().unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_keeps_state_and_backs_up() {
        let (mut store, kv) = memory_store();
        store.add("in memory", Vec::new(), 0.5);
        kv.set("moments", b"{ definitely not a list").unwrap();

        let err = store.load().unwrap_err();
        match err {
            StorageError::Decode { key, backup_key, .. } => {
                assert_eq!(key, "moments");
                assert_eq!(backup_key.as_deref(), Some("moments.corrupt"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(store.len(), 1);
        assert_eq!(
            kv.get("moments.corrupt").unwrap().unwrap(),
            b"{ definitely not a list"
        );
    }

    #[test]
    fn test_load_replaces_with_stored_list() {
        let kv = MemoryKeyValueStore::new();
        let written = {
            let mut store = MomentStore::new(kv.clone(), "moments");
            store.add("one", Vec::new(), 0.2);
            store.add("two", vec![vec![1, 2, 3]], 0.7);
            store.snapshot()
        };

        let mut reopened = MomentStore::new(kv, "moments");
        assert_eq!(reopened.load().unwrap(), 2);
        assert_eq!(reopened.moments(), written.as_slice());
    }

    #[test]
    fn test_newest_first() {
        let (mut store, _) = memory_store();
        let older = store.add("older", Vec::new(), 0.5);
        let mut newer = store.add("newer", Vec::new(), 0.5);

        // Force distinct timestamps regardless of clock resolution
        newer.timestamp = older.timestamp + chrono::Duration::seconds(5);
        store.moments[1].timestamp = newer.timestamp;

        let sorted = store.newest_first();
        assert_eq!(sorted[0].id, newer.id);
        assert_eq!(sorted[1].id, older.id);
        // Insertion order is unchanged
        assert_eq!(store.moments()[0].id, older.id);
    }

    #[test]
    fn test_subscribe_sees_each_change() {
        let (mut store, _) = memory_store();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow_and_update(), 0);

        let moment = store.add("watched", Vec::new(), 0.5);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        store.update(&moment);
        store.delete_matching(&[moment.id].into_iter().collect());
        assert_eq!(*rx.borrow_and_update(), 3);
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let (mut store, _) = memory_store();
        store.add("before snapshot", Vec::new(), 0.5);

        let snapshot = store.snapshot();
        store.add("after snapshot", Vec::new(), 0.5);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_open_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let id = {
            let mut store = MomentStore::open(&config).unwrap();
            store.add("Persistent", vec![vec![7; 16]], 0.6).id
        };

        assert!(config.store_path().exists());

        let store = MomentStore::open(&config).unwrap();
        assert_eq!(store.len(), 1);
        let moment = store.get(id).unwrap();
        assert_eq!(moment.description, "Persistent");
        assert_eq!(moment.images, vec![vec![7; 16]]);
    }

    #[test]
    fn test_open_tolerates_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        std::fs::write(config.store_path(), b"garbage").unwrap();

        let store = MomentStore::open(&config).unwrap();
        assert!(store.is_empty());
        assert!(temp_dir.path().join("moments.corrupt.json").exists());
    }
}
