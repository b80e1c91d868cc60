//! Resource kinds managed by the control loops.
//!
//! Each kind pairs a serde spec struct with its handler wiring: backups
//! fan out to deployment backups, deployment backups are a leaf kind.

mod backup;
mod deployment_backup;

pub use backup::*;
pub use deployment_backup::*;

/// Common shape shared by every resource spec.
///
/// The name is unique within the kind's key prefix and forms the storage
/// key together with it.
pub trait ResourceSpec {
    fn name(&self) -> &str;
}
