use boxstock::{
    config::AppConfig,
    errors::inventory_error::InventoryError,
    models::{
        import_model::{CommitImportRequest, CommitImportResponse, ImportOutcome, ImportTemplateResponse, PreviewImportRequest},
        incoming_box_stock_model::{
            CreateBoxStockRequest, CreateBoxStockResponse, DeleteBoxStockRequest, ListBoxStocksRequest,
            ListBoxStocksResponse,
        },
        inventory_summary_model::BoxedInventoryResponse,
        product_model::{
            CreateProductResponse, DeleteProductRequest, GetProductRequest, ListProductsResponse, NewProduct, Product,
            SearchProductsRequest, UpdateProductRequest,
        },
    },
    repositories::{
        connect, incoming_box_stock_repository::IncomingBoxStockRepository, product_repository::ProductRepository,
    },
    services::{
        bulk_import_service::{BulkImportService, ImportLimits},
        date_filter::DateFilter,
        incoming_box_stock_service::IncomingBoxStockService,
        product_service::ProductService,
    },
};
use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
    server::ServerBuilder,
    types::{ErrorCode, ErrorObject, ErrorObjectOwned},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const TEMPLATE_FILE_NAME: &str = "box_stock_import_template.xlsx";

#[rpc(server)]
pub trait InventoryRpc {
    #[method(name = "list_products")]
    async fn list_products(&self) -> RpcResult<ListProductsResponse>;

    #[method(name = "get_product")]
    async fn get_product(&self, request: GetProductRequest) -> RpcResult<Product>;

    #[method(name = "create_product")]
    async fn create_product(&self, request: NewProduct) -> RpcResult<CreateProductResponse>;

    #[method(name = "update_product")]
    async fn update_product(&self, request: UpdateProductRequest) -> RpcResult<Product>;

    #[method(name = "delete_product")]
    async fn delete_product(&self, request: DeleteProductRequest) -> RpcResult<String>;

    #[method(name = "search_products")]
    async fn search_products(&self, request: SearchProductsRequest) -> RpcResult<Vec<Product>>;

    #[method(name = "list_box_stocks")]
    async fn list_box_stocks(&self, request: ListBoxStocksRequest) -> RpcResult<ListBoxStocksResponse>;

    #[method(name = "boxed_inventory")]
    async fn boxed_inventory(&self) -> RpcResult<BoxedInventoryResponse>;

    #[method(name = "create_box_stock")]
    async fn create_box_stock(
        &self,
        request: CreateBoxStockRequest,
        creator_id: Option<String>,
    ) -> RpcResult<CreateBoxStockResponse>;

    #[method(name = "delete_box_stock")]
    async fn delete_box_stock(&self, request: DeleteBoxStockRequest) -> RpcResult<String>;

    #[method(name = "import_template")]
    async fn import_template(&self) -> RpcResult<ImportTemplateResponse>;

    #[method(name = "preview_import")]
    async fn preview_import(&self, request: PreviewImportRequest) -> RpcResult<ImportOutcome>;

    #[method(name = "commit_import")]
    async fn commit_import(&self, request: CommitImportRequest) -> RpcResult<CommitImportResponse>;

    #[method(name = "health")]
    async fn health(&self) -> RpcResult<String>;
}

pub struct InventoryRpcImpl {
    products: Arc<ProductService>,
    box_stocks: Arc<IncomingBoxStockService>,
    importer: Arc<BulkImportService>,
}

impl InventoryRpcImpl {
    pub async fn new(config: &AppConfig) -> Result<Self, InventoryError> {
        let db = connect(&config.database).await?;
        let catalog = Arc::new(ProductRepository::new(db.clone()));
        let store = Arc::new(IncomingBoxStockRepository::new(db));

        let box_stocks = IncomingBoxStockService::new(catalog.clone(), store)
            .with_low_stock_threshold(config.inventory.low_stock_threshold);

        Ok(Self {
            products: Arc::new(ProductService::new(catalog)),
            box_stocks: Arc::new(box_stocks),
            importer: Arc::new(BulkImportService::new(ImportLimits::from(&config.import))),
        })
    }

    async fn catalog(&self) -> Result<Vec<Product>, InventoryError> {
        Ok(self.products.list_products().await?.products)
    }
}

/// Caller mistakes map to invalid params, everything else to internal error.
fn rpc_error(context: &str, err: InventoryError) -> ErrorObjectOwned {
    error!("{}: {}", context, err);
    let detail = err.to_string();
    let code = ErrorCode::from(err);
    ErrorObject::owned(code.code(), context.to_string(), Some(detail))
}

#[async_trait]
impl InventoryRpcServer for InventoryRpcImpl {
    async fn list_products(&self) -> RpcResult<ListProductsResponse> {
        info!("Listing products");

        match self.products.list_products().await {
            Ok(response) => {
                info!("Products listed successfully: {} products", response.total);
                Ok(response)
            }
            Err(err) => Err(rpc_error("Failed to list products", err)),
        }
    }

    async fn get_product(&self, request: GetProductRequest) -> RpcResult<Product> {
        info!("Getting product: {:?}", request);

        self.products
            .get_product(request)
            .await
            .map_err(|err| rpc_error("Failed to get product", err))
    }

    async fn create_product(&self, request: NewProduct) -> RpcResult<CreateProductResponse> {
        info!("Creating product: {:?}", request);

        match self.products.create_product(request).await {
            Ok(response) => {
                info!("Product created successfully: {}", response.id);
                Ok(response)
            }
            Err(err) => Err(rpc_error("Failed to create product", err)),
        }
    }

    async fn update_product(&self, request: UpdateProductRequest) -> RpcResult<Product> {
        info!("Updating product: {:?}", request);

        self.products
            .update_product(&request.id, request.changes)
            .await
            .map_err(|err| rpc_error("Failed to update product", err))
    }

    async fn delete_product(&self, request: DeleteProductRequest) -> RpcResult<String> {
        info!("Deleting product: {}", request.id);

        match self.products.delete_product(&request.id).await {
            Ok(()) => Ok(format!("Product {} deleted", request.id)),
            Err(err) => Err(rpc_error("Failed to delete product", err)),
        }
    }

    async fn search_products(&self, request: SearchProductsRequest) -> RpcResult<Vec<Product>> {
        self.products
            .search_by_sku(&request.query)
            .await
            .map_err(|err| rpc_error("Failed to search products", err))
    }

    async fn list_box_stocks(&self, request: ListBoxStocksRequest) -> RpcResult<ListBoxStocksResponse> {
        info!("Listing incoming box stocks: {:?}", request);

        let filter: DateFilter = DateFilter::from(&request);
        let query = request.search.as_deref().unwrap_or_default();
        match self.box_stocks.list_box_stocks(&filter, query).await {
            Ok(response) => {
                info!("Showing {} of {} incoming box stocks", response.shown, response.total);
                Ok(response)
            }
            Err(err) => Err(rpc_error("Failed to list incoming box stocks", err)),
        }
    }

    async fn boxed_inventory(&self) -> RpcResult<BoxedInventoryResponse> {
        self.box_stocks
            .boxed_inventory_summary()
            .await
            .map_err(|err| rpc_error("Failed to summarize boxed inventory", err))
    }

    async fn create_box_stock(
        &self,
        request: CreateBoxStockRequest,
        creator_id: Option<String>,
    ) -> RpcResult<CreateBoxStockResponse> {
        info!("Creating incoming box stock: {:?}", request);

        match self.box_stocks.create_box_stock(request, creator_id).await {
            Ok(record) => Ok(CreateBoxStockResponse {
                message: format!(
                    "Recorded {} boxes of {} ({} units)",
                    record.boxes_received, record.sku, record.total_units
                ),
                id: record.id,
                total_units: record.total_units,
            }),
            Err(err) => Err(rpc_error("Failed to create incoming box stock", err)),
        }
    }

    async fn delete_box_stock(&self, request: DeleteBoxStockRequest) -> RpcResult<String> {
        info!("Deleting incoming box stock: {}", request.id);

        match self.box_stocks.delete_box_stock(&request.id).await {
            Ok(()) => Ok(format!("Incoming box stock {} deleted", request.id)),
            Err(err) => Err(rpc_error("Failed to delete incoming box stock", err)),
        }
    }

    async fn import_template(&self) -> RpcResult<ImportTemplateResponse> {
        let result = async {
            let products = self.catalog().await?;
            let content = self.importer.generate_template(&products)?;
            Ok::<_, InventoryError>(ImportTemplateResponse {
                file_name: TEMPLATE_FILE_NAME.to_string(),
                content,
            })
        }
        .await;

        result.map_err(|err| rpc_error("Failed to generate import template", err))
    }

    async fn preview_import(&self, request: PreviewImportRequest) -> RpcResult<ImportOutcome> {
        info!("Previewing import of {} ({} bytes)", request.file_name, request.content.len());

        let result = async {
            let products = self.catalog().await?;
            let outcome = self.importer.process_file(
                &request.content,
                &request.file_name,
                request.content.len() as u64,
                &products,
            )?;
            Ok::<_, InventoryError>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => {
                if outcome.total_warnings > 0 {
                    warn!("Import of {} has {} warnings", request.file_name, outcome.total_warnings);
                }
                Ok(outcome)
            }
            Err(err) => Err(rpc_error("Failed to process import file", err)),
        }
    }

    async fn commit_import(&self, request: CommitImportRequest) -> RpcResult<CommitImportResponse> {
        info!("Committing {} imported entries", request.entries.len());

        match self.box_stocks.import_entries(&request.entries, request.creator_id).await {
            Ok(saved) => Ok(CommitImportResponse {
                created: saved.len(),
                message: format!("Successfully imported {} incoming box records", saved.len()),
            }),
            Err(err) => Err(rpc_error("Failed to import entries", err)),
        }
    }

    async fn health(&self) -> RpcResult<String> {
        Ok("Inventory Service is healthy!".to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Inventory Service...");

    let config = AppConfig::load()?;
    let address = config.server.address();

    let inventory_rpc = InventoryRpcImpl::new(&config).await?;

    let server = ServerBuilder::default().build(address.as_str()).await?;
    let handle = server.start(inventory_rpc.into_rpc());

    info!("Inventory Service started on http://{}", address);
    info!("Available methods:");
    info!("  - list_products() / get_product(id) / create_product(...) / update_product(id, ...) / delete_product(id)");
    info!("  - search_products(query: String)");
    info!("  - list_box_stocks(date_range?, start_date?, end_date?, search?)");
    info!("  - boxed_inventory()");
    info!("  - create_box_stock(product_id, boxes_received, supplier_name, description?), creator_id?");
    info!("  - delete_box_stock(id: String)");
    info!("  - import_template() / preview_import(file_name, content) / commit_import(entries, creator_id?)");
    info!("  - health()");

    let handle_clone = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, gracefully shutting down...");
                if let Err(err) = handle_clone.stop() {
                    warn!("Server was already stopped: {}", err);
                }
            }
            Err(err) => error!("Failed to listen for ctrl+c: {}", err),
        }
    });

    handle.stopped().await;
    info!("Inventory Service shut down gracefully");

    Ok(())
}
