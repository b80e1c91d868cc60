//! Control loops over watchable resources.
//!
//! A [`Controller`] follows the operator pattern: observe changes through
//! a prefix watch, dispatch typed events to a per-kind [`EventHandler`],
//! and converge owned resources through a periodic reconcile pass.
//! [`ControllerRegistry`] starts controllers together and stops them with
//! one shared cancellation token.

mod controller;
mod handler;
mod registry;

pub use controller::*;
pub use handler::*;
pub use registry::*;
