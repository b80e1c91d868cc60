//! # op-engine
//!
//! A lightweight control-loop (operator) engine over a watchable
//! key-value store.
//!
//! Each controller owns one key prefix and runs two cooperating loops: a
//! watch loop that reacts to change events as they happen, and a
//! reconcile loop that periodically re-derives the desired state and
//! repairs drift. Parent resources fan out to derived children through a
//! pluggable [`Derivation`], and a shared cancellation token stops every
//! loop together.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use op_engine::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load(None)?;
//!     let store = Arc::new(MemoryStore::new(settings.store.clone()));
//!
//!     let mut registry = ControllerRegistry::new();
//!     let backup = Controller::new(
//!         BACKUP_PREFIX,
//!         Arc::clone(&store),
//!         Arc::new(FanOutHandler::new(
//!             BACKUP_KIND,
//!             BACKUP_PREFIX,
//!             Arc::clone(&store),
//!             DeploymentBackups,
//!         )),
//!         registry.shutdown_token(),
//!         settings.controller.clone(),
//!     );
//!     registry.spawn(backup);
//!
//!     // Cancel the registry token on SIGTERM, then wait.
//!     registry.join().await;
//!     Ok(())
//! }
//! ```

mod codec;
mod config;
mod constants;
mod controller;
mod errors;
mod resources;
mod store;

pub use codec::*;
pub use config::*;
pub use constants::*;
pub use controller::*;
pub use errors::*;
pub use resources::*;
pub use store::*;
