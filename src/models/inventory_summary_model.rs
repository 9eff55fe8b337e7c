use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{incoming_box_stock_model::IncomingBoxStock, product_model::Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-SKU rollup of incoming box stock. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxedInventorySummary {
    pub sku: String,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub box_quantity: i64,
    pub pairs_per_box: i64,
    pub total_pairs: i64,
    pub last_updated: DateTime<Utc>,
    pub status: StockStatus,
}

/// Products and records loaded together so they describe the same moment.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    pub products: Vec<Product>,
    pub box_stocks: Vec<IncomingBoxStock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxedInventoryResponse {
    pub summaries: Vec<BoxedInventorySummary>,
    pub total_boxes: i64,
    pub total_pairs: i64,
}

impl BoxedInventoryResponse {
    pub fn from_summaries(summaries: Vec<BoxedInventorySummary>) -> Self {
        let total_boxes = summaries.iter().fold(0_i64, |acc, s| acc.saturating_add(s.box_quantity));
        let total_pairs = summaries.iter().fold(0_i64, |acc, s| acc.saturating_add(s.total_pairs));
        Self {
            summaries,
            total_boxes,
            total_pairs,
        }
    }
}
