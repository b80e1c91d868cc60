use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Tuning for the embedded in-memory store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Capacity of each watcher's event channel. A watcher that falls this
    /// far behind starts losing events rather than blocking writers.
    #[serde(default = "default_watch_buffer_size")]
    pub watch_buffer_size: usize,
}

fn default_watch_buffer_size() -> usize {
    64
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            watch_buffer_size: default_watch_buffer_size(),
        }
    }
}

impl StoreConfig {
    /// Validates buffer sizing.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when the buffer capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.watch_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "store.watch_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
