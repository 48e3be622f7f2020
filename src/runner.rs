use std::collections::HashSet;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::error::{is_connectivity, MigrateError, StepError};
use crate::ledger::{LedgerEntry, MigrationLedger};
use crate::registry::StepRegistry;
use crate::step::{MutationStep, SchemaHandle};

/// A step known to the registry but absent from the ledger.
#[derive(Debug, Clone)]
pub struct PendingStep {
    pub version_id: String,
    pub description: String,
}

/// Applied and pending listings for `migrate status`.
#[derive(Debug)]
pub struct MigrationStatus {
    pub applied: Vec<LedgerEntry>,
    pub pending: Vec<PendingStep>,
}

/// Orchestrates sequential application and rollback of steps against the
/// ledger.
///
/// Single-writer: at most one runner is assumed to execute against a given
/// database at a time. Steps run one at a time, strictly ordered, and the
/// sequence is not wrapped in a transaction (enum mutation is not
/// transactional everywhere), so a mid-run failure can leave the schema ahead
/// of the ledger. Step idempotency is the compensating control: rerunning is
/// always safe.
pub struct Runner {
    conn: DatabaseConnection,
    registry: StepRegistry,
}

impl Runner {
    pub fn new(conn: DatabaseConnection, registry: StepRegistry) -> Self {
        Self { conn, registry }
    }

    fn ledger(&self) -> MigrationLedger<'_> {
        MigrationLedger::new(&self.conn)
    }

    fn handle(&self) -> SchemaHandle<'_> {
        SchemaHandle::new(&self.conn)
    }

    fn check_known(&self, version_id: &str) -> Result<(), MigrateError> {
        if self.registry.contains(version_id) {
            Ok(())
        } else {
            Err(MigrateError::UnknownVersion {
                version_id: version_id.to_owned(),
            })
        }
    }

    /// Computes the pending set: registry minus ledger, ascending by version.
    /// Ledger rows that match no registered step abort the run; the ledger is
    /// never repaired automatically.
    pub async fn plan(&self) -> Result<Vec<&dyn MutationStep>, MigrateError> {
        self.ledger().ensure().await?;
        let applied = self.ledger().list_applied().await?;
        for entry in &applied {
            if !self.registry.contains(&entry.version_id) {
                return Err(MigrateError::LedgerInconsistency {
                    version_id: entry.version_id.clone(),
                });
            }
        }
        let applied: HashSet<&str> = applied.iter().map(|e| e.version_id.as_str()).collect();
        Ok(self
            .registry
            .steps()
            .iter()
            .filter(|step| !applied.contains(step.version_id()))
            .map(|step| step.as_ref())
            .collect())
    }

    /// Applies pending steps in ascending version order, up to and including
    /// `to` when given. Each version is recorded only after its forward
    /// action succeeded; the first failure halts the run with no automatic
    /// rollback of the failed step or of prior ones.
    ///
    /// Returns the number of steps applied.
    pub async fn up(&self, to: Option<&str>) -> Result<usize, MigrateError> {
        if let Some(target) = to {
            self.check_known(target)?;
        }
        let pending = self.plan().await?;
        let handle = self.handle();
        let mut applied = 0usize;

        for step in pending {
            if let Some(target) = to {
                if step.version_id() > target {
                    break;
                }
            }
            info!(version = step.version_id(), "applying: {}", step.description());
            step.up(&handle)
                .await
                .map_err(|source| step_failure(step.version_id(), source))?;
            self.ledger().record(step.version_id()).await?;
            applied += 1;
        }

        info!(applied, "migration run complete");
        Ok(applied)
    }

    /// Reverts applied steps with version strictly greater than `to`, in
    /// descending order; with no target, everything applied is reverted. If
    /// any selected step is non-revertible the request is rejected before a
    /// single revert executes. Each ledger entry is erased only after its
    /// backward action succeeded.
    ///
    /// Returns the number of steps reverted.
    pub async fn down(&self, to: Option<&str>) -> Result<usize, MigrateError> {
        if let Some(target) = to {
            self.check_known(target)?;
        }
        self.ledger().ensure().await?;
        let applied = self.ledger().list_applied().await?;

        let mut selected: Vec<&dyn MutationStep> = Vec::new();
        for entry in applied.iter().rev() {
            if let Some(target) = to {
                if entry.version_id.as_str() <= target {
                    continue;
                }
            }
            match self.registry.get(&entry.version_id) {
                Some(step) => selected.push(step),
                None => {
                    return Err(MigrateError::LedgerInconsistency {
                        version_id: entry.version_id.clone(),
                    })
                }
            }
        }

        if let Some(step) = selected.iter().find(|step| !step.revertible()) {
            return Err(MigrateError::NonRevertibleStep {
                version_id: step.version_id().to_owned(),
            });
        }

        let handle = self.handle();
        let mut reverted = 0usize;
        for step in selected {
            info!(version = step.version_id(), "reverting: {}", step.description());
            step.down(&handle)
                .await
                .map_err(|source| step_failure(step.version_id(), source))?;
            self.ledger().erase(step.version_id()).await?;
            reverted += 1;
        }

        info!(reverted, "rollback complete");
        Ok(reverted)
    }

    pub async fn status(&self) -> Result<MigrationStatus, MigrateError> {
        self.ledger().ensure().await?;
        let applied = self.ledger().list_applied().await?;
        let pending = self
            .plan()
            .await?
            .into_iter()
            .map(|step| PendingStep {
                version_id: step.version_id().to_owned(),
                description: step.description().to_owned(),
            })
            .collect();
        Ok(MigrationStatus { applied, pending })
    }
}

/// A lost connection mid-step is a connectivity failure of the run, not a
/// defect of the step itself.
fn step_failure(version_id: &str, source: StepError) -> MigrateError {
    match source {
        StepError::Db(err) if is_connectivity(&err) => MigrateError::Connectivity(err),
        source => MigrateError::Step {
            version_id: version_id.to_owned(),
            source,
        },
    }
}
