use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::{debug, info};

use crate::error::StepError;
use crate::inspector::SchemaInspector;

/// One versioned, self-contained schema mutation.
///
/// Forward actions must be safe to re-run: recording a step can fail after
/// its apply succeeded, in which case the runner treats the step as pending
/// and applies it again on the next run. Every shipped step therefore checks
/// the live schema through [`SchemaHandle`] before acting.
#[async_trait]
pub trait MutationStep: Send + Sync {
    /// Globally unique, totally ordered identifier,
    /// e.g. `m20240101_000001_create_categories`.
    fn version_id(&self) -> &str;

    fn description(&self) -> &str;

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError>;

    /// Steps carrying irreversible changes keep this default and report
    /// `false` from [`revertible`](MutationStep::revertible) instead of
    /// silently doing nothing on revert.
    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        let _ = schema;
        Err(StepError::NotRevertible)
    }

    fn revertible(&self) -> bool {
        true
    }
}

/// Connection wrapper handed to steps. All helpers run a precondition check
/// against the live schema first, so steps built on them are idempotent
/// under re-application.
pub struct SchemaHandle<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> SchemaHandle<'a> {
    pub fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn inspector(&self) -> SchemaInspector<'a> {
        SchemaInspector::new(self.conn)
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    /// Runs a raw DDL statement. Prefer the guarded helpers below; this is
    /// for statements that are already idempotent (e.g. `CREATE INDEX IF NOT
    /// EXISTS`).
    pub async fn execute(&self, sql: &str) -> Result<(), StepError> {
        self.conn
            .execute(Statement::from_string(self.backend(), sql.to_owned()))
            .await?;
        Ok(())
    }

    pub async fn create_table_if_absent(&self, table: &str, ddl: &str) -> Result<(), StepError> {
        if self.inspector().has_table(table).await? {
            debug!(table, "table already present, skipping create");
            return Ok(());
        }
        self.execute(ddl).await
    }

    pub async fn drop_table_if_present(&self, table: &str) -> Result<(), StepError> {
        if !self.inspector().has_table(table).await? {
            debug!(table, "table already absent, skipping drop");
            return Ok(());
        }
        self.execute(&format!("DROP TABLE {table}")).await
    }

    /// `definition` is the full column clause, e.g. `brand VARCHAR(255)`.
    pub async fn add_column_if_missing(
        &self,
        table: &str,
        column: &str,
        definition: &str,
    ) -> Result<(), StepError> {
        if self.inspector().has_column(table, column).await? {
            debug!(table, column, "column already present, skipping add");
            return Ok(());
        }
        self.execute(&format!("ALTER TABLE {table} ADD COLUMN {definition}"))
            .await
    }

    pub async fn drop_column_if_present(
        &self,
        table: &str,
        column: &str,
    ) -> Result<(), StepError> {
        if !self.inspector().has_column(table, column).await? {
            debug!(table, column, "column already absent, skipping drop");
            return Ok(());
        }
        self.execute(&format!("ALTER TABLE {table} DROP COLUMN {column}"))
            .await
    }

    /// Creates a native enum type on backends that have them. On SQLite the
    /// corresponding columns are plain text, so there is nothing to create.
    pub async fn create_enum_if_absent(
        &self,
        name: &str,
        values: &[&str],
    ) -> Result<(), StepError> {
        match self.backend() {
            DatabaseBackend::Postgres => {
                if self.inspector().has_enum(name).await? {
                    debug!(name, "enum type already present, skipping create");
                    return Ok(());
                }
                let labels = values
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.execute(&format!("CREATE TYPE {name} AS ENUM ({labels})"))
                    .await
            }
            DatabaseBackend::Sqlite => {
                debug!(name, "backend has no native enums, nothing to create");
                Ok(())
            }
            DatabaseBackend::MySql => Err(StepError::UnsupportedBackend("mysql")),
        }
    }

    pub async fn drop_enum_if_present(&self, name: &str) -> Result<(), StepError> {
        match self.backend() {
            DatabaseBackend::Postgres => {
                if !self.inspector().has_enum(name).await? {
                    debug!(name, "enum type already absent, skipping drop");
                    return Ok(());
                }
                self.execute(&format!("DROP TYPE {name}")).await
            }
            DatabaseBackend::Sqlite => Ok(()),
            DatabaseBackend::MySql => Err(StepError::UnsupportedBackend("mysql")),
        }
    }

    /// Widens a native enum type with a new value.
    ///
    /// The value is checked against the actual enum contents first: a value
    /// that is already present means the mutation has happened, so it is
    /// logged and treated as success. Any other failure from the add is a
    /// real error and propagates. Postgres cannot remove enum values, so
    /// steps built on this must declare themselves non-revertible.
    pub async fn add_enum_value(&self, enum_name: &str, value: &str) -> Result<(), StepError> {
        match self.backend() {
            DatabaseBackend::Postgres => {
                let existing = self.inspector().enum_values(enum_name).await?;
                if existing.iter().any(|v| v == value) {
                    info!(enum_name, value, "enum value already present, skipping add");
                    return Ok(());
                }
                self.execute(&format!("ALTER TYPE {enum_name} ADD VALUE '{value}'"))
                    .await
            }
            DatabaseBackend::Sqlite => {
                info!(
                    enum_name,
                    value, "backend has no native enums, nothing to widen"
                );
                Ok(())
            }
            DatabaseBackend::MySql => Err(StepError::UnsupportedBackend("mysql")),
        }
    }
}
