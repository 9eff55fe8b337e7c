pub mod import_model;
pub mod incoming_box_stock_model;
pub mod inventory_summary_model;
pub mod product_model;
