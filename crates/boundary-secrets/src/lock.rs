//! In-process per-record locks.
//!
//! Writers to the same `(name, environment)` pair are serialized; different
//! records proceed independently. This does not coordinate separate
//! processes sharing one directory.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one record.
    pub async fn acquire(&self, name: &str, environment: &str) -> RecordGuard<'_> {
        let key = format!("{name}:{environment}");
        // Clone the Arc out so the map shard is not held across the await.
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        RecordGuard {
            locks: &self.locks,
            key,
            guard: Some(guard),
        }
    }

    /// Number of records with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one record. The map entry is dropped with the last
/// holder so the map only tracks records that are in use.
pub struct RecordGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        // The guard owns a clone of the Arc; release it before counting.
        drop(self.guard.take());
        // Waiters clone the Arc before awaiting, so a count of one means
        // only the map refers to it. The shard lock makes this atomic with
        // respect to `acquire`.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
