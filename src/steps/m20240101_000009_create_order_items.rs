use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

pub struct CreateOrderItems;

#[async_trait]
impl MutationStep for CreateOrderItems {
    fn version_id(&self) -> &str {
        "m20240101_000009_create_order_items"
    }

    fn description(&self) -> &str {
        "create order_items table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "order_items",
                "CREATE TABLE order_items (\
                 id UUID PRIMARY KEY, \
                 order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE, \
                 product_id UUID NOT NULL REFERENCES products(id), \
                 variant_id UUID REFERENCES product_variants(id), \
                 quantity INTEGER NOT NULL, \
                 unit_price DECIMAL(12,2) NOT NULL, \
                 created_at TIMESTAMP NOT NULL)",
            )
            .await?;
        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id)")
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("order_items").await
    }
}
