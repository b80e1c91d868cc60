//! Store access layer.
//!
//! Controllers and handlers only ever see the [`KvStore`] trait; the
//! embedded [`MemoryStore`] is one implementation of it. Keys and values
//! are raw bytes end to end, typed interpretation happens in the codec.

mod event;
mod keys;
mod memory;

pub use event::*;
pub use keys::*;
pub use memory::*;

#[cfg(test)]
mod memory_test;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;

use crate::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Stream of event batches produced by a prefix watch. The stream ends
/// when the store revokes the subscription; it never yields errors.
pub type EventStream = BoxStream<'static, EventBatch>;

/// A key together with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Bytes,
    pub value: Bytes,
}

/// Client contract for a watchable key-value store.
///
/// Implementations must be safe to share across tasks; one store handle
/// backs every controller in the process.
///
/// # Ordering
/// Watch events for a prefix are delivered to each subscriber in store
/// revision order. No ordering is guaranteed across distinct subscribers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Stores a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the write cannot be executed.
    async fn put(
        &self,
        key: Bytes,
        value: Bytes,
    ) -> StoreResult<()>;

    /// Deletes a key. Deleting an absent key succeeds and changes nothing.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the delete cannot be executed.
    async fn delete(
        &self,
        key: Bytes,
    ) -> StoreResult<()>;

    /// Returns all live key-value pairs under `prefix`, in key order.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the store cannot be read.
    async fn list_prefix(
        &self,
        prefix: Bytes,
    ) -> StoreResult<Vec<KeyValue>>;

    /// Subscribes to future changes for all keys under `prefix`.
    ///
    /// The subscription starts at the store's current revision; it does
    /// not replay existing keys. Callers that need a snapshot combine
    /// [`KvStore::list_prefix`] with the watch.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the subscription cannot be created.
    async fn watch_prefix(
        &self,
        prefix: Bytes,
    ) -> StoreResult<EventStream>;
}
