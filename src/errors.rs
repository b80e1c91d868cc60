//! Error types for the control-loop engine.
//!
//! `Error` is the single top-level type crossing public API boundaries.
//! Store, codec and handler failures keep their own enums and convert
//! upward via `#[from]`, so call sites can still match on the layer that
//! failed.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store access failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Spec encode/decode failures
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Event handler failures
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Configuration source failures (file parse, env deserialize)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration loaded but failed semantic validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unrecoverable startup failure
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Failures surfaced by a [`KvStore`](crate::store::KvStore) implementation.
///
/// The embedded in-memory store is infallible in practice; these variants
/// model what a remote store client reports so handlers and loops are
/// written against the full contract.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store handle is no longer usable (connection lost or store
    /// shut down).
    #[error("Store channel closed")]
    ChannelClosed,

    /// The operation did not complete in time.
    #[error("Operation timeout")]
    Timeout,

    /// Transport-level failure talking to a remote store.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The store accepted the request but failed to execute it.
    #[error("Server error: {0}")]
    ServerError(String),
}

/// Wire format failures. Decode errors are expected at runtime (any client
/// can write arbitrary bytes under a watched prefix) and must never take a
/// control loop down.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to decode {kind} spec: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {kind} spec: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures reported by event handlers back to the watch loop.
///
/// Fan-out handlers attempt every child operation before reporting, so
/// these carry aggregate counts rather than the first failure.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// One or more child writes failed while fanning a parent upsert out.
    #[error("{failed} of {total} child writes failed for parent '{parent}'")]
    FanOutIncomplete {
        parent: String,
        failed: usize,
        total: usize,
    },

    /// One or more child deletes failed while cascading a parent delete.
    #[error("{failed} of {total} child deletes failed for parent '{parent}'")]
    CascadeIncomplete {
        parent: String,
        failed: usize,
        total: usize,
    },
}
