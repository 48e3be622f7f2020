use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

/// Create the products table with its category foreign key.
pub struct CreateProducts;

#[async_trait]
impl MutationStep for CreateProducts {
    fn version_id(&self) -> &str {
        "m20240101_000002_create_products"
    }

    fn description(&self) -> &str {
        "create products table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "products",
                "CREATE TABLE products (\
                 id UUID PRIMARY KEY, \
                 category_id UUID NOT NULL REFERENCES categories(id), \
                 name VARCHAR(255) NOT NULL, \
                 slug VARCHAR(255) NOT NULL UNIQUE, \
                 description TEXT, \
                 price DECIMAL(12,2) NOT NULL DEFAULT 0, \
                 currency VARCHAR(3) NOT NULL DEFAULT 'USD', \
                 is_active BOOLEAN NOT NULL DEFAULT TRUE, \
                 created_at TIMESTAMP NOT NULL, \
                 updated_at TIMESTAMP)",
            )
            .await?;
        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_products_category_id ON products(category_id)")
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("products").await
    }
}
