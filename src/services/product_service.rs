use std::sync::Arc;

use tracing::info;

use crate::{
    errors::inventory_error::InventoryError,
    models::product_model::{CreateProductResponse, GetProductRequest, ListProductsResponse, NewProduct, Product, ProductUpdate},
    repository::ProductCatalog,
    services::search::search_products_by_sku,
};

pub struct ProductService {
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductService {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        info!("ProductService initialized");
        Self { catalog }
    }

    pub async fn create_product(&self, request: NewProduct) -> Result<CreateProductResponse, InventoryError> {
        self.validate_new_product(&request)?;

        let created = self.catalog.create_product(request).await?;

        Ok(CreateProductResponse {
            id: created.id.clone(),
            message: format!("Product created successfully with id: {}", created.id),
        })
    }

    pub async fn get_product(&self, request: GetProductRequest) -> Result<Product, InventoryError> {
        if request.id.trim().is_empty() {
            return Err(invalid("Product ID cannot be empty"));
        }

        self.catalog.get_product(&request.id).await
    }

    pub async fn list_products(&self) -> Result<ListProductsResponse, InventoryError> {
        let products = self.catalog.fetch_products().await?;
        let total = products.len();

        Ok(ListProductsResponse { products, total })
    }

    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<Product, InventoryError> {
        if id.trim().is_empty() {
            return Err(invalid("Product ID cannot be empty"));
        }
        if update.is_empty() {
            return Err(invalid("Nothing to update"));
        }

        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(invalid("Product name cannot be empty"));
        }
        if update.category.as_deref().is_some_and(|category| category.trim().is_empty()) {
            return Err(invalid("Product category cannot be empty"));
        }
        if update.price.is_some_and(|price| !(price >= 0.0)) {
            return Err(invalid("Price cannot be negative"));
        }
        if update.box_contents.is_some_and(|contents| contents <= 0) {
            return Err(invalid("Box contents must be a positive number"));
        }

        self.catalog.update_product(id, update).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), InventoryError> {
        if id.trim().is_empty() {
            return Err(invalid("Product ID cannot be empty"));
        }

        self.catalog.delete_product(id).await
    }

    pub async fn search_by_sku(&self, query: &str) -> Result<Vec<Product>, InventoryError> {
        let products = self.catalog.fetch_products().await?;
        Ok(search_products_by_sku(&products, query).into_iter().cloned().collect())
    }

    fn validate_new_product(&self, request: &NewProduct) -> Result<(), InventoryError> {
        if request.sku.trim().is_empty() {
            return Err(invalid("Product SKU cannot be empty"));
        }

        if request.name.trim().is_empty() {
            return Err(invalid("Product name cannot be empty"));
        }

        if request.category.trim().is_empty() {
            return Err(invalid("Product category cannot be empty"));
        }

        // NaN fails this too
        if !(request.price >= 0.0) {
            return Err(invalid("Price cannot be negative"));
        }

        if request.box_contents <= 0 {
            return Err(invalid("Box contents must be a positive number"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> InventoryError {
    InventoryError::InvalidProduct {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    #[derive(Default)]
    struct MemoryCatalog {
        products: Mutex<Vec<Product>>,
    }

    #[async_trait]
    impl ProductCatalog for MemoryCatalog {
        async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError> {
            Ok(self.products.lock().unwrap().clone())
        }

        async fn get_product(&self, id: &str) -> Result<Product, InventoryError> {
            self.products
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| InventoryError::ProductNotFound { id: id.to_string() })
        }

        async fn create_product(&self, product: NewProduct) -> Result<Product, InventoryError> {
            let mut products = self.products.lock().unwrap();
            let row = product.for_creation();
            if products.iter().any(|p| p.sku == row.sku) {
                return Err(InventoryError::ProductAlreadyExists { sku: row.sku });
            }
            let created = Product {
                id: format!("p{}", products.len() + 1),
                sku: row.sku,
                name: row.name,
                price: row.price,
                box_contents: row.box_contents,
                category: row.category,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
            };
            products.push(created.clone());
            Ok(created)
        }

        async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<Product, InventoryError> {
            let mut products = self.products.lock().unwrap();
            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| InventoryError::ProductNotFound { id: id.to_string() })?;
            if let Some(box_contents) = update.box_contents {
                product.box_contents = box_contents;
            }
            if let Some(name) = update.name {
                product.name = name;
            }
            product.updated_at = Utc::now();
            Ok(product.clone())
        }

        async fn delete_product(&self, id: &str) -> Result<(), InventoryError> {
            let mut products = self.products.lock().unwrap();
            let before = products.len();
            products.retain(|p| p.id != id);
            if products.len() == before {
                return Err(InventoryError::ProductNotFound { id: id.to_string() });
            }
            Ok(())
        }
    }

    fn new_product(sku: &str) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: "Trail Runner".to_string(),
            price: 89.9,
            box_contents: 12,
            category: "Sneakers".to_string(),
            description: None,
        }
    }

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryCatalog::default()))
    }

    #[tokio::test]
    async fn create_then_list_and_search() {
        let service = service();
        let response = service.create_product(new_product("TR-100")).await.unwrap();
        service.create_product(new_product("BT-200")).await.unwrap();

        assert_eq!(response.message, format!("Product created successfully with id: {}", response.id));
        assert_eq!(service.list_products().await.unwrap().total, 2);

        let found = service.search_by_sku("tr-").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sku, "TR-100");
    }

    #[tokio::test]
    async fn create_enforces_field_rules() {
        let service = service();

        let mut request = new_product("TR-100");
        request.box_contents = 0;
        assert!(matches!(
            service.create_product(request).await,
            Err(InventoryError::InvalidProduct { .. })
        ));

        let mut request = new_product("TR-100");
        request.price = -1.0;
        assert!(matches!(
            service.create_product(request).await,
            Err(InventoryError::InvalidProduct { .. })
        ));

        assert!(matches!(
            service.create_product(new_product("  ")).await,
            Err(InventoryError::InvalidProduct { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_sku_is_rejected() {
        let service = service();
        service.create_product(new_product("TR-100")).await.unwrap();

        let err = service.create_product(new_product("TR-100")).await.unwrap_err();
        assert_eq!(err.to_string(), "Product already exists with SKU: TR-100");
    }

    #[tokio::test]
    async fn update_checks_provided_fields_only() {
        let service = service();
        let id = service.create_product(new_product("TR-100")).await.unwrap().id;

        let updated = service
            .update_product(
                &id,
                ProductUpdate {
                    box_contents: Some(24),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.box_contents, 24);
        assert_eq!(updated.name, "Trail Runner");

        let err = service
            .update_product(
                &id,
                ProductUpdate {
                    box_contents: Some(-2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidProduct { .. }));

        assert!(service.update_product(&id, ProductUpdate::default()).await.is_err());
    }

    #[tokio::test]
    async fn get_and_delete_require_an_id() {
        let service = service();
        let id = service.create_product(new_product("TR-100")).await.unwrap().id;

        assert!(matches!(
            service.get_product(GetProductRequest { id: " ".to_string() }).await,
            Err(InventoryError::InvalidProduct { .. })
        ));
        assert_eq!(
            service.get_product(GetProductRequest { id: id.clone() }).await.unwrap().sku,
            "TR-100"
        );

        service.delete_product(&id).await.unwrap();
        assert!(matches!(
            service.delete_product(&id).await,
            Err(InventoryError::ProductNotFound { .. })
        ));
    }
}
