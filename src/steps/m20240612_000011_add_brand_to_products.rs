use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

/// Add the brand column to products, skipped when a hotfix already added it.
pub struct AddBrandToProducts;

#[async_trait]
impl MutationStep for AddBrandToProducts {
    fn version_id(&self) -> &str {
        "m20240612_000011_add_brand_to_products"
    }

    fn description(&self) -> &str {
        "add brand column to products"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .add_column_if_missing("products", "brand", "brand VARCHAR(255)")
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_column_if_present("products", "brand").await
    }
}
