use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};

/// Create the coupons table. `discount_type` is 'percent' or 'fixed';
/// enforcement lives in the application, not the schema.
pub struct CreateCoupons;

#[async_trait]
impl MutationStep for CreateCoupons {
    fn version_id(&self) -> &str {
        "m20240101_000010_create_coupons"
    }

    fn description(&self) -> &str {
        "create coupons table"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema
            .create_table_if_absent(
                "coupons",
                "CREATE TABLE coupons (\
                 id UUID PRIMARY KEY, \
                 code VARCHAR(64) NOT NULL UNIQUE, \
                 discount_type VARCHAR(16) NOT NULL, \
                 amount DECIMAL(12,2) NOT NULL, \
                 max_uses INTEGER, \
                 used_count INTEGER NOT NULL DEFAULT 0, \
                 starts_at TIMESTAMP, \
                 expires_at TIMESTAMP, \
                 is_active BOOLEAN NOT NULL DEFAULT TRUE, \
                 created_at TIMESTAMP NOT NULL)",
            )
            .await
    }

    async fn down(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.drop_table_if_present("coupons").await
    }
}
