use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ResourceSpec;
use crate::controller::EventHandler;
use crate::Result;

/// Kind label used in logs and error context.
pub const DEPLOYMENT_BACKUP_KIND: &str = "deployment_backup";

/// Derived state written by the backup controller under
/// [`DEPLOYMENT_BACKUP_PREFIX`](crate::constants::DEPLOYMENT_BACKUP_PREFIX).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentBackupSpec {
    pub name: String,
    pub owner_name: String,
    pub status: bool,
}

impl ResourceSpec for DeploymentBackupSpec {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Leaf handler: deployment backups own nothing downstream, so the
/// controller only records what it observes. Reconcile keeps the no-op
/// default.
#[derive(Debug, Default)]
pub struct DeploymentBackupHandler;

#[async_trait]
impl EventHandler for DeploymentBackupHandler {
    type Spec = DeploymentBackupSpec;

    fn kind(&self) -> &'static str {
        DEPLOYMENT_BACKUP_KIND
    }

    async fn apply(
        &self,
        spec: DeploymentBackupSpec,
    ) -> Result<()> {
        debug!(
            name = %spec.name,
            owner = %spec.owner_name,
            status = spec.status,
            "deployment backup observed"
        );
        Ok(())
    }

    async fn cleanup(
        &self,
        name: &str,
    ) -> Result<()> {
        debug!(name = %name, "deployment backup removed");
        Ok(())
    }
}
