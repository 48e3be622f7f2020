use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

pub struct CreateProductImages;

#[async_trait]
impl MutationStep for CreateProductImages {
    fn version_id(&self) -> &str {
        "m20240101_000004_create_product_images"
    }

    fn description(&self) -> &str {
        "create product_images table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "product_images",
                "CREATE TABLE product_images (\
                 id UUID PRIMARY KEY, \
                 product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE, \
                 url VARCHAR(1024) NOT NULL, \
                 alt_text VARCHAR(255), \
                 position INTEGER NOT NULL DEFAULT 0, \
                 created_at TIMESTAMP NOT NULL)",
            )
            .await?;
        schema
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_product_images_product_id \
                 ON product_images(product_id)",
            )
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("product_images").await
    }
}
