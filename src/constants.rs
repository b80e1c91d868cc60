// -
// Key namespaces

/// Key prefix owned by the backup controller.
pub const BACKUP_PREFIX: &str = "/backup";

/// Key prefix owned by the deployment-backup controller.
pub const DEPLOYMENT_BACKUP_PREFIX: &str = "/deployment_backup";

// -
// Conventional child names
//
// Every backup parent owns exactly these two deployment backups. The names
// are derivable from the parent identity alone, which the cascade-delete
// path relies on.

pub(crate) const DEPLOYMENT_ONE: &str = "deployment_one";

pub(crate) const DEPLOYMENT_TWO: &str = "deployment_two";
