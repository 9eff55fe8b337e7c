use thiserror::Error;

use crate::errors::{import_error::ImportError, validation_error::ValidationError};

#[derive(Error, Debug)]
pub enum InventoryError {
    /// A store call failed. `message` is what the caller shows; the raw
    /// store error is kept as the source.
    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Product not found with id: {id}")]
    ProductNotFound { id: String },

    #[error("Incoming box stock not found with id: {id}")]
    BoxStockNotFound { id: String },

    #[error("Product already exists with SKU: {sku}")]
    ProductAlreadyExists { sku: String },

    #[error("Invalid product: {message}")]
    InvalidProduct { message: String },

    #[error("Product {name} ({sku}) has invalid box contents value. Please update the product in Product Master.")]
    InvalidBoxContents { name: String, sku: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Import stopped after saving {saved} of {total} entries: {source}")]
    PartialImport {
        saved: usize,
        total: usize,
        #[source]
        source: Box<InventoryError>,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl InventoryError {
    pub fn persistence(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        InventoryError::Persistence {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl From<InventoryError> for jsonrpsee::types::ErrorCode {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ProductNotFound { .. } => jsonrpsee::types::ErrorCode::InvalidParams,
            InventoryError::BoxStockNotFound { .. } => jsonrpsee::types::ErrorCode::InvalidParams,
            InventoryError::ProductAlreadyExists { .. } => jsonrpsee::types::ErrorCode::InvalidParams,
            InventoryError::InvalidProduct { .. } => jsonrpsee::types::ErrorCode::InvalidParams,
            InventoryError::InvalidBoxContents { .. } => jsonrpsee::types::ErrorCode::InvalidParams,
            InventoryError::Validation(_) => jsonrpsee::types::ErrorCode::InvalidParams,
            InventoryError::Import(_) => jsonrpsee::types::ErrorCode::InvalidParams,
            _ => jsonrpsee::types::ErrorCode::InternalError,
        }
    }
}
