//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in currency unit (JSON number on the wire)
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Available inventory, upper bound on orderable quantity
    pub stock: u32,
}

/// Create/update product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
}

/// Stock adjustment payload (reduce-stock / restore-stock)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub product_id: u64,
    pub quantity: u32,
}
