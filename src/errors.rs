pub mod import_error;
pub mod inventory_error;
pub mod validation_error;
