use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

/// Create the locations table (pickup points and fulfillment warehouses).
pub struct CreateLocations;

#[async_trait]
impl MutationStep for CreateLocations {
    fn version_id(&self) -> &str {
        "m20240101_000007_create_locations"
    }

    fn description(&self) -> &str {
        "create locations table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "locations",
                "CREATE TABLE locations (\
                 id UUID PRIMARY KEY, \
                 name VARCHAR(255) NOT NULL, \
                 code VARCHAR(32) NOT NULL UNIQUE, \
                 city VARCHAR(128), \
                 country_code VARCHAR(2), \
                 is_active BOOLEAN NOT NULL DEFAULT TRUE, \
                 created_at TIMESTAMP NOT NULL)",
            )
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("locations").await
    }
}
