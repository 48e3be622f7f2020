use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

pub struct CreateAddresses;

#[async_trait]
impl MutationStep for CreateAddresses {
    fn version_id(&self) -> &str {
        "m20240101_000006_create_addresses"
    }

    fn description(&self) -> &str {
        "create addresses table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "addresses",
                "CREATE TABLE addresses (\
                 id UUID PRIMARY KEY, \
                 user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE, \
                 line1 VARCHAR(255) NOT NULL, \
                 line2 VARCHAR(255), \
                 city VARCHAR(128) NOT NULL, \
                 region VARCHAR(128), \
                 postal_code VARCHAR(32), \
                 country_code VARCHAR(2) NOT NULL, \
                 is_default BOOLEAN NOT NULL DEFAULT FALSE, \
                 created_at TIMESTAMP NOT NULL)",
            )
            .await?;
        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_addresses_user_id ON addresses(user_id)")
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("addresses").await
    }
}
