//! Versioned schema steps for the storefront catalog, one module per step.
//!
//! Module names double as version ids; keep them `m<date>_<seq>_<description>`
//! so lexicographic order is application order.

pub mod m20240101_000001_create_categories;
pub mod m20240101_000002_create_products;
pub mod m20240101_000003_create_product_variants;
pub mod m20240101_000004_create_product_images;
pub mod m20240101_000005_create_users;
pub mod m20240101_000006_create_addresses;
pub mod m20240101_000007_create_locations;
pub mod m20240101_000008_create_orders;
pub mod m20240101_000009_create_order_items;
pub mod m20240101_000010_create_coupons;
pub mod m20240612_000011_add_brand_to_products;
pub mod m20240901_000012_add_refunded_order_status;

use crate::step::MutationStep;

/// Every step shipped with this build, in no particular order; the registry
/// owns sorting.
pub fn all() -> Vec<Box<dyn MutationStep>> {
    vec![
        Box::new(m20240101_000001_create_categories::CreateCategories),
        Box::new(m20240101_000002_create_products::CreateProducts),
        Box::new(m20240101_000003_create_product_variants::CreateProductVariants),
        Box::new(m20240101_000004_create_product_images::CreateProductImages),
        Box::new(m20240101_000005_create_users::CreateUsers),
        Box::new(m20240101_000006_create_addresses::CreateAddresses),
        Box::new(m20240101_000007_create_locations::CreateLocations),
        Box::new(m20240101_000008_create_orders::CreateOrders),
        Box::new(m20240101_000009_create_order_items::CreateOrderItems),
        Box::new(m20240101_000010_create_coupons::CreateCoupons),
        Box::new(m20240612_000011_add_brand_to_products::AddBrandToProducts),
        Box::new(m20240901_000012_add_refunded_order_status::AddRefundedOrderStatus),
    ]
}
