use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{engine::local::Db, sql::Thing, Surreal};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    errors::inventory_error::InventoryError,
    models::incoming_box_stock_model::{IncomingBoxStock, NewIncomingBoxStock},
    repository::IncomingBoxStockStore,
};

const BOX_STOCK_TABLE: &str = "incoming_box_stock";

#[derive(Debug, Clone, Deserialize)]
struct IncomingBoxStockRow {
    id: Thing,
    incoming_date: DateTime<Utc>,
    product_id: String,
    sku: String,
    boxes_received: i64,
    supplier_name: String,
    description: Option<String>,
    total_units: i64,
    creator_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<IncomingBoxStockRow> for IncomingBoxStock {
    fn from(row: IncomingBoxStockRow) -> Self {
        IncomingBoxStock {
            id: row.id.id.to_raw(),
            incoming_date: row.incoming_date,
            product_id: row.product_id,
            sku: row.sku,
            boxes_received: row.boxes_received,
            supplier_name: row.supplier_name,
            description: row.description,
            total_units: row.total_units,
            creator_id: row.creator_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct IncomingBoxStockRepository {
    db: Surreal<Db>,
}

impl IncomingBoxStockRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IncomingBoxStockStore for IncomingBoxStockRepository {
    async fn fetch_incoming_box_stocks(&self) -> Result<Vec<IncomingBoxStock>, InventoryError> {
        let rows: Vec<IncomingBoxStockRow> = self
            .db
            .query("SELECT * FROM incoming_box_stock ORDER BY created_at DESC")
            .await
            .and_then(|mut response| response.take(0))
            .map_err(|e| {
                error!("Error fetching incoming box stocks: {}", e);
                InventoryError::persistence("Failed to fetch incoming box stocks", e)
            })?;

        info!("Retrieved {} incoming box stock records", rows.len());
        Ok(rows.into_iter().map(IncomingBoxStock::from).collect())
    }

    async fn get_incoming_box_stock(&self, id: &str) -> Result<IncomingBoxStock, InventoryError> {
        let row: Option<IncomingBoxStockRow> = self
            .db
            .select((BOX_STOCK_TABLE, id))
            .await
            .map_err(|e| {
                InventoryError::persistence(format!("Failed to fetch incoming box stock {}", id), e)
            })?;

        row.map(IncomingBoxStock::from)
            .ok_or_else(|| InventoryError::BoxStockNotFound { id: id.to_string() })
    }

    async fn create_incoming_box_stock(
        &self,
        entry: NewIncomingBoxStock,
        creator_id: Option<String>,
    ) -> Result<IncomingBoxStock, InventoryError> {
        let id = Uuid::new_v4().to_string();
        let created: Option<IncomingBoxStockRow> = self
            .db
            .create((BOX_STOCK_TABLE, id.as_str()))
            .content(entry.for_creation(creator_id))
            .await
            .map_err(|e| {
                error!("Error creating incoming box stock: {}", e);
                InventoryError::persistence("Failed to create incoming box stock", e)
            })?;

        match created {
            Some(row) => {
                info!(
                    "Created incoming box stock {} ({} boxes of {})",
                    id, row.boxes_received, row.sku
                );
                Ok(row.into())
            }
            None => {
                error!("Failed to create incoming box stock");
                Err(InventoryError::Internal(anyhow::anyhow!(
                    "Store returned no record for created incoming box stock"
                )))
            }
        }
    }

    async fn delete_incoming_box_stock(&self, id: &str) -> Result<(), InventoryError> {
        let deleted: Option<IncomingBoxStockRow> = self
            .db
            .delete((BOX_STOCK_TABLE, id))
            .await
            .map_err(|e| {
                error!("Error deleting incoming box stock {}: {}", id, e);
                InventoryError::persistence(format!("Failed to delete incoming box stock {}", id), e)
            })?;

        match deleted {
            Some(_) => {
                info!("Deleted incoming box stock with id: {}", id);
                Ok(())
            }
            None => Err(InventoryError::BoxStockNotFound { id: id.to_string() }),
        }
    }
}
