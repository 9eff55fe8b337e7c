//! Contracts for the backing record store.
//!
//! The engine never talks to a database directly; services receive these
//! traits as `Arc<dyn ...>` so the store can be swapped (SurrealDB in the
//! binary and tests, anything else in a host application). Every failure
//! surfaces as [`InventoryError`], never as a raw transport error.

use async_trait::async_trait;

use crate::{
    errors::inventory_error::InventoryError,
    models::{
        incoming_box_stock_model::{IncomingBoxStock, NewIncomingBoxStock},
        product_model::{NewProduct, Product, ProductUpdate},
    },
};

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All products, newest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError>;

    async fn get_product(&self, id: &str) -> Result<Product, InventoryError>;

    async fn create_product(&self, product: NewProduct) -> Result<Product, InventoryError>;

    async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<Product, InventoryError>;

    async fn delete_product(&self, id: &str) -> Result<(), InventoryError>;
}

#[async_trait]
pub trait IncomingBoxStockStore: Send + Sync {
    /// All incoming records, newest first.
    async fn fetch_incoming_box_stocks(&self) -> Result<Vec<IncomingBoxStock>, InventoryError>;

    async fn get_incoming_box_stock(&self, id: &str) -> Result<IncomingBoxStock, InventoryError>;

    /// Persists the entry and returns the stored record with its generated
    /// id and timestamps.
    async fn create_incoming_box_stock(
        &self,
        entry: NewIncomingBoxStock,
        creator_id: Option<String>,
    ) -> Result<IncomingBoxStock, InventoryError>;

    async fn delete_incoming_box_stock(&self, id: &str) -> Result<(), InventoryError>;
}
