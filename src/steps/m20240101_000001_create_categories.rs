use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

/// Create the categories table (self-referencing tree via parent_id).
pub struct CreateCategories;

#[async_trait]
impl MutationStep for CreateCategories {
    fn version_id(&self) -> &str {
        "m20240101_000001_create_categories"
    }

    fn description(&self) -> &str {
        "create categories table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "categories",
                "CREATE TABLE categories (\
                 id UUID PRIMARY KEY, \
                 name VARCHAR(255) NOT NULL, \
                 slug VARCHAR(255) NOT NULL UNIQUE, \
                 parent_id UUID REFERENCES categories(id), \
                 position INTEGER NOT NULL DEFAULT 0, \
                 created_at TIMESTAMP NOT NULL, \
                 updated_at TIMESTAMP)",
            )
            .await?;
        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_categories_parent_id ON categories(parent_id)")
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("categories").await
    }
}
