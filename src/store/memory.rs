//! Embedded in-memory store with prefix watches.
//!
//! Mutations and event dispatch happen under one write lock, so every
//! watcher observes changes in revision order. Dispatch is non-blocking:
//! a watcher whose channel is full loses the event, and a watcher whose
//! stream was dropped is unregistered on the next dispatch.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;
use tracing::warn;

use super::EventBatch;
use super::EventStream;
use super::KeyValue;
use super::KvStore;
use super::StoreResult;
use super::WatchEvent;
use crate::config::StoreConfig;

struct Watcher {
    prefix: Bytes,
    sender: mpsc::Sender<EventBatch>,
}

/// In-process [`KvStore`] used by the embedded deployment mode and tests.
pub struct MemoryStore {
    /// Live key space, ordered for prefix scans
    entries: RwLock<BTreeMap<Bytes, Bytes>>,
    /// Active watchers keyed by registration id
    watchers: DashMap<u64, Watcher>,
    next_watcher_id: AtomicU64,
    /// Bumped once per accepted mutation
    revision: AtomicU64,
    config: StoreConfig,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            watchers: DashMap::new(),
            next_watcher_id: AtomicU64::new(1),
            revision: AtomicU64::new(0),
            config,
        }
    }

    /// Current value of a key, if present. Test and inspection helper;
    /// controllers go through [`KvStore::list_prefix`].
    pub fn get(
        &self,
        key: &[u8],
    ) -> Option<Bytes> {
        self.entries.read().get(key).cloned()
    }

    /// Monotonic mutation counter. Unchanged writes (deletes of absent
    /// keys) do not bump it, which makes convergence observable.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Number of registered watchers, primarily for tests.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Delivers one event to every watcher whose prefix matches.
    ///
    /// Must be called with the entries lock held so dispatch order equals
    /// mutation order.
    fn notify(
        &self,
        event: WatchEvent,
    ) {
        let key = event.key.clone();
        let batch = EventBatch::from(event);
        self.watchers.retain(|id, watcher| {
            if !key.starts_with(watcher.prefix.as_ref()) {
                return true;
            }
            match watcher.sender.try_send(batch.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!("Watcher {} buffer full, dropping event for {:?}", id, key);
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Watcher {} gone, unregistering", id);
                    false
                }
            }
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(
        &self,
        key: Bytes,
        value: Bytes,
    ) -> StoreResult<()> {
        let mut entries = self.entries.write();
        entries.insert(key.clone(), value.clone());
        self.revision.fetch_add(1, Ordering::SeqCst);
        self.notify(WatchEvent::put(key, value));
        Ok(())
    }

    async fn delete(
        &self,
        key: Bytes,
    ) -> StoreResult<()> {
        let mut entries = self.entries.write();
        if entries.remove(&key).is_some() {
            self.revision.fetch_add(1, Ordering::SeqCst);
            self.notify(WatchEvent::delete(key));
        }
        Ok(())
    }

    async fn list_prefix(
        &self,
        prefix: Bytes,
    ) -> StoreResult<Vec<KeyValue>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(prefix.as_ref()))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn watch_prefix(
        &self,
        prefix: Bytes,
    ) -> StoreResult<EventStream> {
        let (sender, receiver) = mpsc::channel(self.config.watch_buffer_size);
        let id = self.next_watcher_id.fetch_add(1, Ordering::Relaxed);
        self.watchers.insert(id, Watcher {
            prefix: prefix.clone(),
            sender,
        });
        debug!("Registered watcher {} for prefix {:?}", id, prefix);
        Ok(ReceiverStream::new(receiver).boxed())
    }
}
