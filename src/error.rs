use sea_orm::DbErr;
use thiserror::Error;

/// Failure of a single step's forward or backward action.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("backend {0} is not supported by this tool")]
    UnsupportedBackend(&'static str),

    /// Returned by `down` on steps that carry irreversible changes.
    #[error("step has no backward action")]
    NotRevertible,

    #[error("{0}")]
    Failed(String),
}

/// Top-level error taxonomy of a migration run. Every failure that aborts a
/// run carries the version of the step it happened in, so the operator knows
/// where to look before rerunning.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The store is unreachable. Fatal for this run; rerunning the whole
    /// sequence is the only retry the tool supports.
    #[error("database unreachable: {0}")]
    Connectivity(#[source] DbErr),

    #[error("step {version_id} failed: {source}")]
    Step {
        version_id: String,
        #[source]
        source: StepError,
    },

    /// Rollback was requested past a step that declares itself
    /// non-revertible. Rejected before any revert executes.
    #[error("cannot roll back past non-revertible step {version_id}")]
    NonRevertibleStep { version_id: String },

    /// The ledger records a version the registry knows nothing about.
    /// Surfaced as-is; the tool never repairs the ledger on its own.
    #[error("ledger references unknown step {version_id}")]
    LedgerInconsistency { version_id: String },

    #[error("two steps registered under version {version_id}")]
    DuplicateVersion { version_id: String },

    #[error("--to refers to unknown step version {version_id}")]
    UnknownVersion { version_id: String },

    #[error("ledger operation failed: {0}")]
    Ledger(#[source] DbErr),
}

impl MigrateError {
    pub(crate) fn from_ledger_err(err: DbErr) -> Self {
        if is_connectivity(&err) {
            MigrateError::Connectivity(err)
        } else {
            MigrateError::Ledger(err)
        }
    }

    /// The version id of the step this error happened in, if any.
    pub fn version_id(&self) -> Option<&str> {
        match self {
            MigrateError::Step { version_id, .. }
            | MigrateError::NonRevertibleStep { version_id }
            | MigrateError::LedgerInconsistency { version_id }
            | MigrateError::DuplicateVersion { version_id }
            | MigrateError::UnknownVersion { version_id } => Some(version_id),
            MigrateError::Connectivity(_) | MigrateError::Ledger(_) => None,
        }
    }
}

pub(crate) fn is_connectivity(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}
