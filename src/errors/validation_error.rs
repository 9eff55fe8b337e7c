use thiserror::Error;

/// Why a single candidate entry was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Product ID is required and must be a valid string")]
    MissingProductId,

    #[error("Boxes received is required")]
    MissingBoxesReceived,

    #[error("Supplier name is required and cannot be empty")]
    MissingSupplierName,

    #[error("Product with ID {id} not found in the database")]
    ProductNotFound { id: String },

    #[error("Boxes received must be a valid number")]
    InvalidBoxesReceived,

    #[error("Boxes received must be a positive number")]
    NonPositiveBoxesReceived,

    #[error("Boxes received is too large")]
    BoxesReceivedTooLarge,
}

/// Non-fatal findings on an entry that is still accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    #[error("Unusually large quantity ({boxes} boxes). Please verify.")]
    LargeQuantity { boxes: i64 },

    #[error("Product {name} has {box_contents} items per box. Please verify product configuration.")]
    MisconfiguredBoxContents { name: String, box_contents: i32 },
}
