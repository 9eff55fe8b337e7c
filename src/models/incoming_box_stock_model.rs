use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::import_model::ValidatedImportEntry;

/// One shipment receipt of boxed stock from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingBoxStock {
    pub id: String,
    pub incoming_date: DateTime<Utc>,
    pub product_id: String,
    /// Copy of the product SKU taken when the record was written.
    pub sku: String,
    pub boxes_received: i64,
    pub supplier_name: String,
    pub description: Option<String>,
    /// Frozen at creation as `boxes_received * box_contents`.
    pub total_units: i64,
    pub creator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncomingBoxStock {
    pub incoming_date: DateTime<Utc>,
    pub product_id: String,
    pub sku: String,
    pub boxes_received: i64,
    pub supplier_name: String,
    pub description: Option<String>,
    pub total_units: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingBoxStockForCreation {
    pub incoming_date: DateTime<Utc>,
    pub product_id: String,
    pub sku: String,
    pub boxes_received: i64,
    pub supplier_name: String,
    pub description: Option<String>,
    pub total_units: i64,
    pub creator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewIncomingBoxStock {
    pub fn from_validated(entry: &ValidatedImportEntry, incoming_date: DateTime<Utc>) -> Self {
        Self {
            incoming_date,
            product_id: entry.product_id.clone(),
            sku: entry.sku.clone(),
            boxes_received: entry.boxes_received,
            supplier_name: entry.supplier_name.clone(),
            description: if entry.description.is_empty() {
                None
            } else {
                Some(entry.description.clone())
            },
            total_units: entry.total_units,
        }
    }

    pub fn for_creation(&self, creator_id: Option<String>) -> IncomingBoxStockForCreation {
        let now = Utc::now();
        IncomingBoxStockForCreation {
            incoming_date: self.incoming_date,
            product_id: self.product_id.clone(),
            sku: self.sku.clone(),
            boxes_received: self.boxes_received,
            supplier_name: self.supplier_name.clone(),
            description: self.description.clone(),
            total_units: self.total_units,
            creator_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Single-entry submission from the "add incoming box" form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoxStockRequest {
    pub product_id: String,
    pub boxes_received: i64,
    pub supplier_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBoxStockRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoxStockResponse {
    pub id: String,
    pub total_units: i64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBoxStocksRequest {
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub start_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub end_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBoxStocksResponse {
    pub box_stocks: Vec<IncomingBoxStock>,
    pub shown: usize,
    pub total: usize,
}
