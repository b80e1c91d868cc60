use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Loop cadences for a controller.
///
/// There is a single reconciliation interval; the watch loop and the
/// reconcile loop never share a timer, so one value is enough to describe
/// how often self-healing runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Milliseconds between reconcile passes. The first pass runs as soon
    /// as the loop starts.
    #[serde(default = "default_reconcile_interval_ms")]
    pub reconcile_interval_ms: u64,

    /// Milliseconds to back off before re-establishing a watch stream
    /// that ended or failed to subscribe.
    #[serde(default = "default_resubscribe_delay_ms")]
    pub resubscribe_delay_ms: u64,
}

fn default_reconcile_interval_ms() -> u64 {
    5000
}

fn default_resubscribe_delay_ms() -> u64 {
    1000
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_ms: default_reconcile_interval_ms(),
            resubscribe_delay_ms: default_resubscribe_delay_ms(),
        }
    }
}

impl ControllerConfig {
    /// Validates cadence values.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when an interval is zero.
    pub fn validate(&self) -> Result<()> {
        if self.reconcile_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "controller.reconcile_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.resubscribe_delay_ms == 0 {
            return Err(Error::InvalidConfig(
                "controller.resubscribe_delay_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
