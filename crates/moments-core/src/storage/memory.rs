use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use super::error::{StorageError, StorageResult};
use super::persistence::KeyValueStore;

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, Vec<u8>>,
    simulate_write_error: bool,
}

/// In-memory key-value slot.
///
/// Clones share the same underlying map, so a test can keep a handle for
/// inspection while the store owns another. Uses `Rc<RefCell<..>>` since
/// the store is single-threaded.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.inner.borrow_mut().simulate_write_error = simulate;
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.inner.borrow().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.inner.borrow().blobs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.simulate_write_error {
            return Err(StorageError::WriteError {
                path: PathBuf::from(key),
                source: io::Error::new(io::ErrorKind::Other, "Simulated write error"),
            });
        }
        inner.blobs.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
