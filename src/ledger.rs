use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement,
};
use tracing::debug;

use crate::error::MigrateError;

/// Name of the bookkeeping table, kept inside the store being migrated so
/// ledger state and schema state cannot diverge onto separate backends.
pub const LEDGER_TABLE: &str = "schema_ledger";

/// One row per applied step.
#[derive(Debug, Clone, FromQueryResult)]
pub struct LedgerEntry {
    pub version_id: String,
    pub applied_at: DateTime<Utc>,
}

/// Persisted record of which steps have been applied. Only the runner writes
/// to it; steps report success or failure and never touch the ledger.
pub struct MigrationLedger<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> MigrationLedger<'a> {
    pub fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    /// Creates the bookkeeping table on first contact with a database.
    pub async fn ensure(&self) -> Result<(), MigrateError> {
        let timestamp_type = match self.backend() {
            DatabaseBackend::Postgres => "TIMESTAMPTZ",
            _ => "TIMESTAMP",
        };
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {LEDGER_TABLE} \
             (version_id TEXT PRIMARY KEY, applied_at {timestamp_type} NOT NULL)"
        );
        self.conn
            .execute(Statement::from_string(self.backend(), sql))
            .await
            .map_err(MigrateError::from_ledger_err)?;
        Ok(())
    }

    /// Applied steps in ascending version order.
    pub async fn list_applied(&self) -> Result<Vec<LedgerEntry>, MigrateError> {
        let stmt = Statement::from_string(
            self.backend(),
            format!(
                "SELECT version_id, applied_at FROM {LEDGER_TABLE} ORDER BY version_id ASC"
            ),
        );
        LedgerEntry::find_by_statement(stmt)
            .all(self.conn)
            .await
            .map_err(MigrateError::from_ledger_err)
    }

    /// Records a step as applied. Called strictly after the step's forward
    /// action completed; if this write fails the step counts as unapplied on
    /// the next run.
    pub async fn record(&self, version_id: &str) -> Result<(), MigrateError> {
        let sql = match self.backend() {
            DatabaseBackend::Postgres => {
                format!("INSERT INTO {LEDGER_TABLE} (version_id, applied_at) VALUES ($1, $2)")
            }
            _ => format!("INSERT INTO {LEDGER_TABLE} (version_id, applied_at) VALUES (?, ?)"),
        };
        let stmt = Statement::from_sql_and_values(
            self.backend(),
            sql,
            [version_id.into(), Utc::now().into()],
        );
        self.conn
            .execute(stmt)
            .await
            .map_err(MigrateError::from_ledger_err)?;
        debug!(version_id, "recorded in ledger");
        Ok(())
    }

    /// Removes a step's entry after its backward action completed.
    pub async fn erase(&self, version_id: &str) -> Result<(), MigrateError> {
        let sql = match self.backend() {
            DatabaseBackend::Postgres => {
                format!("DELETE FROM {LEDGER_TABLE} WHERE version_id = $1")
            }
            _ => format!("DELETE FROM {LEDGER_TABLE} WHERE version_id = ?"),
        };
        let stmt = Statement::from_sql_and_values(self.backend(), sql, [version_id.into()]);
        self.conn
            .execute(stmt)
            .await
            .map_err(MigrateError::from_ledger_err)?;
        debug!(version_id, "erased from ledger");
        Ok(())
    }
}
