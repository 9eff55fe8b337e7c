use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{engine::local::Db, sql::Thing, Surreal};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    errors::inventory_error::InventoryError,
    models::product_model::{NewProduct, Product, ProductUpdate},
    repository::ProductCatalog,
};

const PRODUCT_TABLE: &str = "product";

#[derive(Debug, Clone, Deserialize)]
struct ProductRow {
    id: Thing,
    sku: String,
    name: String,
    price: f64,
    box_contents: i32,
    category: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id.id.to_raw(),
            sku: row.sku,
            name: row.name,
            price: row.price,
            box_contents: row.box_contents,
            category: row.category,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    box_contents: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<ProductUpdate> for ProductPatch {
    fn from(update: ProductUpdate) -> Self {
        ProductPatch {
            name: update.name,
            price: update.price,
            box_contents: update.box_contents,
            category: update.category,
            description: update.description,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct ProductRepository {
    db: Surreal<Db>,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>, InventoryError> {
        let products: Vec<ProductRow> = self
            .db
            .query("SELECT * FROM product WHERE sku = $sku")
            .bind(("sku", sku.to_string()))
            .await
            .and_then(|mut response| response.take(0))
            .map_err(|e| InventoryError::persistence("Failed to look up product by SKU", e))?;

        Ok(products.into_iter().next().map(Product::from))
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError> {
        let rows: Vec<ProductRow> = self
            .db
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await
            .and_then(|mut response| response.take(0))
            .map_err(|e| {
                error!("Error fetching products: {}", e);
                InventoryError::persistence("Failed to fetch products", e)
            })?;

        info!("Retrieved {} products", rows.len());
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: &str) -> Result<Product, InventoryError> {
        let row: Option<ProductRow> = self
            .db
            .select((PRODUCT_TABLE, id))
            .await
            .map_err(|e| InventoryError::persistence(format!("Failed to fetch product {}", id), e))?;

        match row {
            Some(row) => {
                info!("Retrieved product with id: {}", id);
                Ok(row.into())
            }
            None => Err(InventoryError::ProductNotFound { id: id.to_string() }),
        }
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, InventoryError> {
        let for_creation = product.for_creation();

        if self.get_product_by_sku(&for_creation.sku).await?.is_some() {
            return Err(InventoryError::ProductAlreadyExists {
                sku: for_creation.sku,
            });
        }

        let id = Uuid::new_v4().to_string();
        let created: Option<ProductRow> = self
            .db
            .create((PRODUCT_TABLE, id.as_str()))
            .content(for_creation)
            .await
            .map_err(|e| {
                error!("Error creating product: {}", e);
                InventoryError::persistence("Failed to create product", e)
            })?;

        match created {
            Some(row) => {
                info!("Created product {} with id: {}", row.sku, id);
                Ok(row.into())
            }
            None => {
                error!("Failed to create product");
                Err(InventoryError::Internal(anyhow::anyhow!(
                    "Store returned no record for created product"
                )))
            }
        }
    }

    async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<Product, InventoryError> {
        // Surface a not-found error instead of a silent no-op
        self.get_product(id).await?;

        let updated: Option<ProductRow> = self
            .db
            .update((PRODUCT_TABLE, id))
            .merge(ProductPatch::from(update))
            .await
            .map_err(|e| InventoryError::persistence(format!("Failed to update product {}", id), e))?;

        match updated {
            Some(row) => {
                info!("Updated product with id: {}", id);
                Ok(row.into())
            }
            None => Err(InventoryError::ProductNotFound { id: id.to_string() }),
        }
    }

    async fn delete_product(&self, id: &str) -> Result<(), InventoryError> {
        let deleted: Option<ProductRow> = self
            .db
            .delete((PRODUCT_TABLE, id))
            .await
            .map_err(|e| InventoryError::persistence(format!("Failed to delete product {}", id), e))?;

        match deleted {
            Some(_) => {
                info!("Deleted product with id: {}", id);
                Ok(())
            }
            None => Err(InventoryError::ProductNotFound { id: id.to_string() }),
        }
    }
}
