use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tracing::{error, info, warn};

use crate::{
    errors::inventory_error::InventoryError,
    models::{
        import_model::{RawImportEntry, ValidatedImportEntry},
        incoming_box_stock_model::{CreateBoxStockRequest, IncomingBoxStock, ListBoxStocksResponse, NewIncomingBoxStock},
        inventory_summary_model::{BoxedInventoryResponse, InventorySnapshot},
    },
    repository::{IncomingBoxStockStore, ProductCatalog},
    services::{
        date_filter::DateFilter,
        inventory_aggregator::{summarize_with_threshold, LOW_STOCK_THRESHOLD},
        search::filter_box_stocks,
        validation_service::validate_entry,
    },
};

pub struct IncomingBoxStockService {
    catalog: Arc<dyn ProductCatalog>,
    store: Arc<dyn IncomingBoxStockStore>,
    low_stock_threshold: i64,
}

impl IncomingBoxStockService {
    pub fn new(catalog: Arc<dyn ProductCatalog>, store: Arc<dyn IncomingBoxStockStore>) -> Self {
        info!("IncomingBoxStockService initialized");
        Self {
            catalog,
            store,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Products and records fetched concurrently; the first failure wins.
    pub async fn load_snapshot(&self) -> Result<InventorySnapshot, InventoryError> {
        let (products, box_stocks) = tokio::try_join!(
            self.catalog.fetch_products(),
            self.store.fetch_incoming_box_stocks()
        )?;

        Ok(InventorySnapshot { products, box_stocks })
    }

    pub async fn boxed_inventory_summary(&self) -> Result<BoxedInventoryResponse, InventoryError> {
        let snapshot = self.load_snapshot().await?;
        let summaries = summarize_with_threshold(&snapshot.box_stocks, &snapshot.products, self.low_stock_threshold);
        Ok(BoxedInventoryResponse::from_summaries(summaries))
    }

    pub async fn list_box_stocks<Tz: TimeZone>(
        &self,
        filter: &DateFilter<Tz>,
        query: &str,
    ) -> Result<ListBoxStocksResponse, InventoryError> {
        let snapshot = self.load_snapshot().await?;
        let total = snapshot.box_stocks.len();

        let in_range: Vec<IncomingBoxStock> = filter
            .filter(&snapshot.box_stocks, |record| record.incoming_date)
            .cloned()
            .collect();
        let box_stocks: Vec<IncomingBoxStock> = filter_box_stocks(&in_range, &snapshot.products, query)
            .into_iter()
            .cloned()
            .collect();

        Ok(ListBoxStocksResponse {
            shown: box_stocks.len(),
            total,
            box_stocks,
        })
    }

    /// Single entry from the form. Unlike bulk import, a product with no
    /// usable box contents is refused outright.
    pub async fn create_box_stock(
        &self,
        request: CreateBoxStockRequest,
        creator_id: Option<String>,
    ) -> Result<IncomingBoxStock, InventoryError> {
        let products = self.catalog.fetch_products().await?;

        let raw = RawImportEntry {
            product_id: Some(request.product_id),
            boxes_received: Some(request.boxes_received.into()),
            supplier_name: Some(request.supplier_name),
            description: request.description,
        };

        let validated = match validate_entry(&raw, &products) {
            Ok(validated) => validated,
            Err(errors) => {
                return Err(match errors.into_iter().next() {
                    Some(first) => first.into(),
                    None => anyhow::anyhow!("entry rejected without a reason").into(),
                })
            }
        };

        if validated.entry.box_contents <= 0 {
            return Err(InventoryError::InvalidBoxContents {
                name: validated.entry.product_name,
                sku: validated.entry.sku,
            });
        }
        for warning in &validated.warnings {
            warn!("Accepting box stock for {}: {}", validated.entry.sku, warning);
        }

        let entry = NewIncomingBoxStock::from_validated(&validated.entry, Utc::now());
        let record = self.store.create_incoming_box_stock(entry, creator_id).await?;

        info!(
            "Recorded {} boxes of {} ({} units)",
            record.boxes_received, record.sku, record.total_units
        );
        Ok(record)
    }

    /// Persists validated entries in order. The first failure stops the run
    /// and reports how many entries were already saved.
    pub async fn import_entries(
        &self,
        entries: &[ValidatedImportEntry],
        creator_id: Option<String>,
    ) -> Result<Vec<IncomingBoxStock>, InventoryError> {
        let incoming_date = Utc::now();
        let mut saved = Vec::with_capacity(entries.len());

        for entry in entries {
            let new_entry = NewIncomingBoxStock::from_validated(entry, incoming_date);
            match self.store.create_incoming_box_stock(new_entry, creator_id.clone()).await {
                Ok(record) => saved.push(record),
                Err(err) => {
                    error!("Bulk import failed after {} of {} entries: {}", saved.len(), entries.len(), err);
                    return Err(InventoryError::PartialImport {
                        saved: saved.len(),
                        total: entries.len(),
                        source: Box::new(err),
                    });
                }
            }
        }

        info!("Imported {} incoming box stock entries", saved.len());
        Ok(saved)
    }

    pub async fn delete_box_stock(&self, id: &str) -> Result<(), InventoryError> {
        if id.trim().is_empty() {
            return Err(InventoryError::BoxStockNotFound { id: id.to_string() });
        }

        self.store.delete_incoming_box_stock(id).await?;
        info!("Deleted incoming box stock {}", id);
        Ok(())
    }
}
