//! Layered runtime configuration.
//!
//! Values resolve in order: built-in defaults, then an optional TOML file
//! (explicit path argument or `CONFIG_PATH`), then environment variables
//! prefixed `OP_ENGINE_` with `__` separating nested sections, e.g.
//! `OP_ENGINE_CONTROLLER__RECONCILE_INTERVAL_MS=250`.

mod controller;
mod store;

pub use controller::*;
pub use store::*;

#[cfg(test)]
mod config_test;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use tracing::debug;

use crate::Result;

/// Root settings for the engine process.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Embedded store tuning
    #[serde(default)]
    pub store: StoreConfig,

    /// Control-loop cadences shared by all controllers
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl Settings {
    /// Loads settings from defaults, optional file and environment.
    ///
    /// # Arguments
    /// * `config_path` - Optional path to a TOML file. When `None`, the
    ///   `CONFIG_PATH` environment variable is consulted instead.
    ///
    /// # Errors
    /// Returns an error when a named file is missing or malformed, or when
    /// the merged settings fail [`Settings::validate`].
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            debug!("loading config file: {}", path);
            builder = builder.add_source(File::with_name(path).required(true));
        } else if let Ok(path) = env::var("CONFIG_PATH") {
            debug!("loading config file from CONFIG_PATH: {}", path);
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("OP_ENGINE")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates every section after merging.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.controller.validate()?;
        Ok(())
    }
}
