pub mod bulk_import_service;
pub mod date_filter;
pub mod incoming_box_stock_service;
pub mod inventory_aggregator;
pub mod product_service;
pub mod search;
pub mod validation_service;
