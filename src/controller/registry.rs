//! Startup and shutdown coordination for a set of controllers.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use super::Controller;
use super::ControllerHandles;
use super::EventHandler;
use crate::store::KvStore;

/// Owns the shared cancellation token and the running loop tasks.
///
/// Every controller built for a registry takes a clone of
/// [`shutdown_token`]; cancelling it stops all controllers together.
///
/// [`shutdown_token`]: ControllerRegistry::shutdown_token
pub struct ControllerRegistry {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// Token to pass to every controller spawned through this registry.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Starts a controller and tracks its two loop tasks.
    pub fn spawn<S, H>(
        &mut self,
        controller: Controller<S, H>,
    ) where
        S: KvStore + 'static,
        H: EventHandler + 'static,
    {
        let ControllerHandles {
            watch,
            reconcile,
        } = controller.start();
        self.handles.push(watch);
        self.handles.push(reconcile);
    }

    /// Requests shutdown and waits for every loop task to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.join().await;
    }

    /// Waits for every loop task to exit without requesting shutdown.
    /// Intended for the main task after wiring a signal handler to the
    /// shutdown token.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "controller task aborted");
            }
        }
        info!("all control loops stopped");
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
