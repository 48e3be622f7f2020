use std::collections::BTreeMap;

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement,
};

use crate::error::StepError;

/// Metadata for a single column as currently observed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub data_type: String,
    pub is_nullable: bool,
}

/// Read-only view over live schema metadata.
///
/// Deliberately uncached: steps decide whether to act based on the state the
/// store is in right now, so every call issues a fresh catalog query.
pub struct SchemaInspector<'a> {
    conn: &'a DatabaseConnection,
}

#[derive(FromQueryResult)]
struct PgColumnRow {
    column_name: String,
    data_type: String,
    is_nullable: String,
}

#[derive(FromQueryResult)]
struct SqliteColumnRow {
    column_name: String,
    data_type: String,
    is_notnull: i32,
}

#[derive(FromQueryResult)]
struct NameRow {
    #[allow(dead_code)]
    name: String,
}

#[derive(FromQueryResult)]
struct EnumValueRow {
    value: String,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    /// Returns the columns of `table` as observed at call time. An absent
    /// table yields an empty mapping.
    pub async fn describe(&self, table: &str) -> Result<BTreeMap<String, ColumnInfo>, StepError> {
        match self.backend() {
            DatabaseBackend::Postgres => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    "SELECT column_name, data_type, is_nullable \
                     FROM information_schema.columns \
                     WHERE table_schema = 'public' AND table_name = $1",
                    [table.into()],
                );
                let rows = PgColumnRow::find_by_statement(stmt).all(self.conn).await?;
                Ok(rows
                    .into_iter()
                    .map(|row| {
                        (
                            row.column_name,
                            ColumnInfo {
                                data_type: row.data_type,
                                is_nullable: row.is_nullable == "YES",
                            },
                        )
                    })
                    .collect())
            }
            DatabaseBackend::Sqlite => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Sqlite,
                    "SELECT name AS column_name, type AS data_type, \"notnull\" AS is_notnull \
                     FROM pragma_table_info(?)",
                    [table.into()],
                );
                let rows = SqliteColumnRow::find_by_statement(stmt)
                    .all(self.conn)
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|row| {
                        (
                            row.column_name,
                            ColumnInfo {
                                data_type: row.data_type,
                                is_nullable: row.is_notnull == 0,
                            },
                        )
                    })
                    .collect())
            }
            DatabaseBackend::MySql => Err(StepError::UnsupportedBackend("mysql")),
        }
    }

    pub async fn has_table(&self, table: &str) -> Result<bool, StepError> {
        let stmt = match self.backend() {
            DatabaseBackend::Postgres => Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT table_name AS name FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_name = $1",
                [table.into()],
            ),
            DatabaseBackend::Sqlite => Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
                [table.into()],
            ),
            DatabaseBackend::MySql => return Err(StepError::UnsupportedBackend("mysql")),
        };
        let row = NameRow::find_by_statement(stmt).one(self.conn).await?;
        Ok(row.is_some())
    }

    pub async fn has_column(&self, table: &str, column: &str) -> Result<bool, StepError> {
        Ok(self.describe(table).await?.contains_key(column))
    }

    /// Whether a native enum type of the given name exists. Always false on
    /// backends without native enums.
    pub async fn has_enum(&self, name: &str) -> Result<bool, StepError> {
        match self.backend() {
            DatabaseBackend::Postgres => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    "SELECT typname AS name FROM pg_type WHERE typname = $1 AND typtype = 'e'",
                    [name.into()],
                );
                let row = NameRow::find_by_statement(stmt).one(self.conn).await?;
                Ok(row.is_some())
            }
            DatabaseBackend::Sqlite => Ok(false),
            DatabaseBackend::MySql => Err(StepError::UnsupportedBackend("mysql")),
        }
    }

    /// The labels of a native enum type in declaration order. Empty on
    /// backends without native enums or when the type does not exist.
    pub async fn enum_values(&self, name: &str) -> Result<Vec<String>, StepError> {
        match self.backend() {
            DatabaseBackend::Postgres => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    "SELECT e.enumlabel AS value FROM pg_enum e \
                     JOIN pg_type t ON t.oid = e.enumtypid \
                     WHERE t.typname = $1 ORDER BY e.enumsortorder",
                    [name.into()],
                );
                let rows = EnumValueRow::find_by_statement(stmt).all(self.conn).await?;
                Ok(rows.into_iter().map(|row| row.value).collect())
            }
            DatabaseBackend::Sqlite => Ok(vec![]),
            DatabaseBackend::MySql => Err(StepError::UnsupportedBackend("mysql")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    async fn memory_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        Database::connect(opts).await.expect("in-memory sqlite")
    }

    #[tokio::test]
    async fn describe_reports_live_columns() {
        let conn = memory_db().await;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "CREATE TABLE widgets (id INTEGER PRIMARY KEY, label TEXT NOT NULL, note TEXT)"
                .to_owned(),
        ))
        .await
        .expect("create table");

        let inspector = SchemaInspector::new(&conn);
        assert!(inspector.has_table("widgets").await.unwrap());
        assert!(!inspector.has_table("gadgets").await.unwrap());

        let columns = inspector.describe("widgets").await.unwrap();
        assert_eq!(columns.len(), 3);
        assert!(!columns["label"].is_nullable);
        assert!(columns["note"].is_nullable);
        assert!(inspector.has_column("widgets", "label").await.unwrap());
        assert!(!inspector.has_column("widgets", "price").await.unwrap());
    }

    #[tokio::test]
    async fn describe_of_missing_table_is_empty() {
        let conn = memory_db().await;
        let inspector = SchemaInspector::new(&conn);
        assert!(inspector.describe("nowhere").await.unwrap().is_empty());
    }
}
