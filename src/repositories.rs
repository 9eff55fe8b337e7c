pub mod incoming_box_stock_repository;
pub mod product_repository;

use surrealdb::{
    engine::local::{Db, Mem},
    Surreal,
};
use tracing::info;

use crate::{config::DatabaseConfig, errors::inventory_error::InventoryError};

/// Opens the in-memory SurrealDB instance shared by both repositories.
pub async fn connect(config: &DatabaseConfig) -> Result<Surreal<Db>, InventoryError> {
    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| InventoryError::persistence("Failed to open the inventory database", e))?;

    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await
        .map_err(|e| InventoryError::persistence("Failed to select the inventory database", e))?;

    info!(
        "Connected to SurrealDB (ns: {}, db: {})",
        config.namespace, config.database
    );

    Ok(db)
}
