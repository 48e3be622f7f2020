use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

pub struct CreateProductVariants;

#[async_trait]
impl MutationStep for CreateProductVariants {
    fn version_id(&self) -> &str {
        "m20240101_000003_create_product_variants"
    }

    fn description(&self) -> &str {
        "create product_variants table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "product_variants",
                "CREATE TABLE product_variants (\
                 id UUID PRIMARY KEY, \
                 product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE, \
                 sku VARCHAR(64) NOT NULL UNIQUE, \
                 name VARCHAR(255), \
                 price DECIMAL(12,2), \
                 stock INTEGER NOT NULL DEFAULT 0, \
                 created_at TIMESTAMP NOT NULL)",
            )
            .await?;
        schema
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_product_variants_product_id \
                 ON product_variants(product_id)",
            )
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("product_variants").await
    }
}
