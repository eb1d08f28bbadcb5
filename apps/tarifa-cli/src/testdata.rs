//! Sample tariff and order shared by the command tests.

pub const CATALOG_JSON: &str = include_str!("../../../demos/tariff.json");

pub const ORDER_JSON: &str = include_str!("../../../demos/order.json");
