//! A controller binds one key prefix to one handler and runs two loops
//! against it: a watch loop reacting to change events and a reconcile
//! loop converging state on a timer. The loops share nothing but the
//! store handle and the shutdown token.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::EventHandler;
use crate::codec::decode_spec;
use crate::config::ControllerConfig;
use crate::store::is_valid_prefix;
use crate::store::resource_name;
use crate::store::EventBatch;
use crate::store::EventKind;
use crate::store::KvStore;

/// Join handles for a started controller's two loop tasks.
pub struct ControllerHandles {
    pub watch: JoinHandle<()>,
    pub reconcile: JoinHandle<()>,
}

/// A control loop bound to one key prefix.
pub struct Controller<S, H>
where
    S: KvStore,
    H: EventHandler,
{
    prefix: String,
    store: Arc<S>,
    handler: Arc<H>,
    shutdown: CancellationToken,
    config: ControllerConfig,
}

impl<S, H> Controller<S, H>
where
    S: KvStore + 'static,
    H: EventHandler + 'static,
{
    /// Creates a controller for `prefix`.
    ///
    /// # Panics
    /// Panics when the prefix is not slash-rooted or ends with a slash.
    /// This is the only place the engine fails fast; everything after
    /// startup is handled by logging and retrying.
    pub fn new(
        prefix: impl Into<String>,
        store: Arc<S>,
        handler: Arc<H>,
        shutdown: CancellationToken,
        config: ControllerConfig,
    ) -> Self {
        let prefix = prefix.into();
        assert!(
            is_valid_prefix(&prefix),
            "controller prefix must be slash-rooted without a trailing slash, got '{prefix}'"
        );
        Self {
            prefix,
            store,
            handler,
            shutdown,
            config,
        }
    }

    /// Launches the watch loop and the reconcile loop, returning
    /// immediately. The loops run until the shutdown token is cancelled.
    pub fn start(self) -> ControllerHandles {
        let controller = Arc::new(self);
        let watch = tokio::spawn(Arc::clone(&controller).watch_loop());
        let reconcile = tokio::spawn(controller.reconcile_loop());
        ControllerHandles {
            watch,
            reconcile,
        }
    }

    async fn watch_loop(self: Arc<Self>) {
        let kind = self.handler.kind();
        loop {
            let mut stream = match self
                .store
                .watch_prefix(Bytes::from(self.prefix.clone()))
                .await
            {
                Ok(stream) => stream,
                Err(e) => {
                    error!(controller = kind, error = %e, "watch subscription failed");
                    if !self.resubscribe_delay().await {
                        return;
                    }
                    continue;
                }
            };
            info!(controller = kind, prefix = %self.prefix, "watching");

            loop {
                tokio::select! {
                    // Shutdown wins over pending batches; no draining.
                    _ = self.shutdown.cancelled() => {
                        info!(controller = kind, "watch loop shutting down");
                        return;
                    }

                    batch = stream.next() => match batch {
                        Some(batch) => self.process_batch(batch).await,
                        None => {
                            warn!(controller = kind, "watch stream ended, re-subscribing");
                            break;
                        }
                    }
                }
            }

            if !self.resubscribe_delay().await {
                return;
            }
        }
    }

    /// Sleeps the configured re-subscribe backoff. Returns `false` when
    /// shutdown was requested during the wait.
    async fn resubscribe_delay(&self) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(Duration::from_millis(self.config.resubscribe_delay_ms)) => true,
        }
    }

    /// Applies one event batch in order. A malformed value or a failing
    /// handler skips that event only; the rest of the batch still runs.
    async fn process_batch(
        &self,
        batch: EventBatch,
    ) {
        let kind = self.handler.kind();
        debug!(controller = kind, events = batch.len(), "received events");

        for event in batch.events {
            match event.kind {
                EventKind::Put => {
                    let spec = match decode_spec::<H::Spec>(kind, &event.value) {
                        Ok(spec) => spec,
                        Err(e) => {
                            error!(controller = kind, key = ?event.key, error = %e, "failed to decode event");
                            continue;
                        }
                    };
                    if let Err(e) = self.handler.apply(spec).await {
                        error!(controller = kind, key = ?event.key, error = %e, "failed to handle event");
                    }
                }

                EventKind::Delete => {
                    // Delete events carry no value; dispatch by key name.
                    let name = match resource_name(&self.prefix, &event.key) {
                        Some(name) => name,
                        None => {
                            warn!(controller = kind, key = ?event.key, "delete for key outside naming scheme");
                            continue;
                        }
                    };
                    if let Err(e) = self.handler.cleanup(name).await {
                        error!(controller = kind, key = ?event.key, error = %e, "failed to handle event");
                    }
                }
            }
        }
    }

    /// Runs [`EventHandler::reconcile`] on a fixed cadence. The first pass
    /// fires as soon as the loop starts and doubles as the startup
    /// convergence pass.
    async fn reconcile_loop(self: Arc<Self>) {
        let kind = self.handler.kind();
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.reconcile_interval_ms));
        // A long pass pushes the next tick out instead of firing a burst.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!(controller = kind, "reconcile loop shutting down");
                    return;
                }

                _ = interval.tick() => {
                    debug!(controller = kind, "reconciling");
                    if let Err(e) = self.handler.reconcile().await {
                        error!(controller = kind, error = %e, "reconcile pass failed");
                    }
                }
            }
        }
    }
}
