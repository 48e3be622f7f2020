use async_trait::async_trait;

use crate::error::StepError;
use crate::step::{MutationStep, SchemaHandle};
use crate::steps::m20240101_000008_create_orders::ORDER_STATUS_ENUM;

/// Widen order_status with 'refunded'. Postgres cannot remove enum values,
/// so this step is non-revertible and blocks any rollback past it.
pub struct AddRefundedOrderStatus;

#[async_trait]
impl MutationStep for AddRefundedOrderStatus {
    fn version_id(&self) -> &str {
        "m20240901_000012_add_refunded_order_status"
    }

    fn description(&self) -> &str {
        "add refunded value to order_status enum"
    }

    async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
        schema.add_enum_value(ORDER_STATUS_ENUM, "refunded").await
    }

    fn revertible(&self) -> bool {
        false
    }
}
