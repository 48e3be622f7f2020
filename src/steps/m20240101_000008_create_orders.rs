use async_trait::async_trait;
use sea_orm::DatabaseBackend;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

pub const ORDER_STATUS_ENUM: &str = "order_status";
pub const ORDER_STATUS_VALUES: [&str; 5] =
    ["pending", "processing", "shipped", "delivered", "cancelled"];

/// Create the orders table. On Postgres the status column is a native enum;
/// elsewhere it is plain text with the same value set.
pub struct CreateOrders;

#[async_trait]
impl MutationStep for CreateOrders {
    fn version_id(&self) -> &str {
        "m20240101_000008_create_orders"
    }

    fn description(&self) -> &str {
        "create orders table and order_status enum"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_enum_if_absent(ORDER_STATUS_ENUM, &ORDER_STATUS_VALUES)
            .await?;

        let status_type = match schema.backend() {
            DatabaseBackend::Postgres => ORDER_STATUS_ENUM,
            _ => "TEXT",
        };
        schema
            .create_table_if_absent(
                "orders",
                &format!(
                    "CREATE TABLE orders (\
                     id UUID PRIMARY KEY, \
                     user_id UUID NOT NULL REFERENCES users(id), \
                     order_number VARCHAR(32) NOT NULL UNIQUE, \
                     status {status_type} NOT NULL DEFAULT 'pending', \
                     total_amount DECIMAL(12,2) NOT NULL DEFAULT 0, \
                     currency VARCHAR(3) NOT NULL DEFAULT 'USD', \
                     coupon_id UUID, \
                     shipping_address_id UUID REFERENCES addresses(id), \
                     location_id UUID REFERENCES locations(id), \
                     placed_at TIMESTAMP NOT NULL, \
                     created_at TIMESTAMP NOT NULL, \
                     updated_at TIMESTAMP)"
                ),
            )
            .await?;

        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)")
            .await?;
        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)")
            .await?;
        schema
            .execute("CREATE INDEX IF NOT EXISTS idx_orders_placed_at ON orders(placed_at)")
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("orders").await?;
        schema.drop_enum_if_present(ORDER_STATUS_ENUM).await
    }
}
