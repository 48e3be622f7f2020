use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

/// Create the users table. `coin_balance` is the store-credit counter the
/// shop front spends and support staff adjust.
pub struct CreateUsers;

#[async_trait]
impl MutationStep for CreateUsers {
    fn version_id(&self) -> &str {
        "m20240101_000005_create_users"
    }

    fn description(&self) -> &str {
        "create users table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "users",
                "CREATE TABLE users (\
                 id UUID PRIMARY KEY, \
                 email VARCHAR(255) NOT NULL UNIQUE, \
                 password_hash VARCHAR(255) NOT NULL, \
                 full_name VARCHAR(255), \
                 phone VARCHAR(32), \
                 coin_balance INTEGER NOT NULL DEFAULT 0, \
                 is_admin BOOLEAN NOT NULL DEFAULT FALSE, \
                 created_at TIMESTAMP NOT NULL, \
                 updated_at TIMESTAMP)",
            )
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("users").await
    }
}
