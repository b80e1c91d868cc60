use serde::Deserialize;
use serde::Serialize;

use super::DeploymentBackupSpec;
use super::ResourceSpec;
use crate::constants::DEPLOYMENT_BACKUP_PREFIX;
use crate::constants::DEPLOYMENT_ONE;
use crate::constants::DEPLOYMENT_TWO;
use crate::controller::Derivation;

/// Kind label used in logs and error context.
pub const BACKUP_KIND: &str = "backup";

/// Desired state of a backup, written by external clients under
/// [`BACKUP_PREFIX`](crate::constants::BACKUP_PREFIX).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSpec {
    pub name: String,
    pub status: bool,
}

impl ResourceSpec for BackupSpec {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ownership policy of the backup kind: every backup owns the two
/// conventionally named deployment backups. Cardinality and naming live
/// here, not in the controller machinery.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentBackups;

impl Derivation for DeploymentBackups {
    type Parent = BackupSpec;
    type Child = DeploymentBackupSpec;

    fn child_kind(&self) -> &'static str {
        super::DEPLOYMENT_BACKUP_KIND
    }

    fn child_prefix(&self) -> &'static str {
        DEPLOYMENT_BACKUP_PREFIX
    }

    fn children(
        &self,
        parent: &BackupSpec,
    ) -> Vec<(String, DeploymentBackupSpec)> {
        self.child_names(&parent.name)
            .into_iter()
            .map(|name| {
                let spec = DeploymentBackupSpec {
                    name: name.clone(),
                    owner_name: parent.name.clone(),
                    status: false,
                };
                (name, spec)
            })
            .collect()
    }

    fn child_names(
        &self,
        _parent_name: &str,
    ) -> Vec<String> {
        vec![DEPLOYMENT_ONE.to_string(), DEPLOYMENT_TWO.to_string()]
    }
}
