use bytes::Bytes;

/// Kind of change observed on a watched key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Key was created or its value replaced.
    Put,
    /// Key was removed.
    Delete,
}

/// One key change delivered to a prefix watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Full key that changed
    pub key: Bytes,
    /// New value; empty for deletes
    pub value: Bytes,
    /// Change kind
    pub kind: EventKind,
}

impl WatchEvent {
    pub fn put(
        key: Bytes,
        value: Bytes,
    ) -> Self {
        Self {
            key,
            value,
            kind: EventKind::Put,
        }
    }

    pub fn delete(key: Bytes) -> Self {
        Self {
            key,
            value: Bytes::new(),
            kind: EventKind::Delete,
        }
    }
}

/// A group of events delivered together, ordered by store revision.
///
/// The embedded store emits one event per batch; a remote store may
/// coalesce several revisions into one delivery. Consumers must preserve
/// in-batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub events: Vec<WatchEvent>,
}

impl EventBatch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl From<WatchEvent> for EventBatch {
    fn from(event: WatchEvent) -> Self {
        Self {
            events: vec![event],
        }
    }
}
