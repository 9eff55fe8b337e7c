//! Per-SKU rollup of incoming box stock.
//!
//! Records are grouped by their denormalized `sku`, not by `product_id`.
//! Two products that share a SKU are merged into one summary; use
//! [`find_sku_conflicts`] to detect that upstream integrity problem.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::models::{
    incoming_box_stock_model::IncomingBoxStock,
    inventory_summary_model::{BoxedInventorySummary, StockStatus},
    product_model::Product,
};

/// Positive box quantities below this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

pub fn summarize(records: &[IncomingBoxStock], products: &[Product]) -> Vec<BoxedInventorySummary> {
    summarize_with_threshold(records, products, LOW_STOCK_THRESHOLD)
}

/// Summaries come out in order of each SKU's first appearance in `records`.
/// Quantities and pair counts saturate at `i64::MAX` instead of wrapping.
pub fn summarize_with_threshold(
    records: &[IncomingBoxStock],
    products: &[Product],
    low_stock_threshold: i64,
) -> Vec<BoxedInventorySummary> {
    let catalog: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    for conflict in find_sku_conflicts(records) {
        warn!(
            "SKU {} is shared by products {:?}; their stock is merged",
            conflict.sku, conflict.product_ids
        );
    }

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<BoxedInventorySummary> = Vec::new();

    for record in records {
        match positions.get(record.sku.as_str()) {
            Some(&position) => {
                let summary = &mut summaries[position];
                summary.box_quantity = summary.box_quantity.saturating_add(record.boxes_received);
                summary.total_pairs = summary.box_quantity.saturating_mul(summary.pairs_per_box);
                if record.updated_at > summary.last_updated {
                    summary.last_updated = record.updated_at;
                }
            }
            None => {
                let product = catalog.get(record.product_id.as_str()).copied();
                let pairs_per_box = product.map(|p| i64::from(p.box_contents)).unwrap_or(0);

                positions.insert(record.sku.as_str(), summaries.len());
                summaries.push(BoxedInventorySummary {
                    sku: record.sku.clone(),
                    product_id: record.product_id.clone(),
                    product_name: product_name(&record.product_id, product),
                    category: product
                        .map(|p| p.category.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    box_quantity: record.boxes_received,
                    pairs_per_box,
                    total_pairs: record.boxes_received.saturating_mul(pairs_per_box),
                    last_updated: record.updated_at,
                    status: StockStatus::InStock,
                });
            }
        }
    }

    for summary in &mut summaries {
        summary.status = stock_status(summary.box_quantity, low_stock_threshold);
    }

    debug!(
        "Summarized {} records into {} SKUs",
        records.len(),
        summaries.len()
    );
    summaries
}

pub fn stock_status(box_quantity: i64, low_stock_threshold: i64) -> StockStatus {
    if box_quantity == 0 {
        StockStatus::OutOfStock
    } else if box_quantity < low_stock_threshold {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

fn product_name(product_id: &str, product: Option<&Product>) -> String {
    match product {
        Some(product) => product.name.clone(),
        None if product_id.is_empty() => "Unknown Product (No ID)".to_string(),
        None => format!("Unknown Product (ID: {})", product_id),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuConflict {
    pub sku: String,
    pub product_ids: Vec<String>,
}

/// SKUs whose records reference more than one product id.
pub fn find_sku_conflicts(records: &[IncomingBoxStock]) -> Vec<SkuConflict> {
    let mut by_sku: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for record in records {
        by_sku
            .entry(record.sku.as_str())
            .or_default()
            .insert(record.product_id.as_str());
    }

    let mut conflicts: Vec<SkuConflict> = by_sku
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(sku, ids)| SkuConflict {
            sku: sku.to_string(),
            product_ids: ids.into_iter().map(str::to_string).collect(),
        })
        .collect();
    conflicts.sort_by(|a, b| a.sku.cmp(&b.sku));
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    fn product(id: &str, sku: &str, box_contents: i32) -> Product {
        Product {
            id: id.to_string(),
            sku: sku.to_string(),
            name: format!("Runner {}", sku),
            price: 79.5,
            box_contents,
            category: "Sneakers".to_string(),
            description: None,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    fn record(id: &str, product_id: &str, sku: &str, boxes: i64, updated: DateTime<Utc>) -> IncomingBoxStock {
        IncomingBoxStock {
            id: id.to_string(),
            incoming_date: updated,
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            boxes_received: boxes,
            supplier_name: "Acme".to_string(),
            description: None,
            total_units: 0,
            creator_id: None,
            created_at: updated,
            updated_at: updated,
        }
    }

    #[test]
    fn records_with_same_sku_are_folded() {
        let products = vec![product("p1", "SKU-1", 12), product("p2", "SKU-2", 6)];
        let records = vec![
            record("r1", "p1", "SKU-1", 3, at(2)),
            record("r2", "p2", "SKU-2", 10, at(3)),
            record("r3", "p1", "SKU-1", 4, at(5)),
            record("r4", "p1", "SKU-1", 1, at(4)),
        ];

        let summaries = summarize(&records, &products);

        assert_eq!(summaries.len(), 2);
        let first = &summaries[0];
        assert_eq!(first.sku, "SKU-1");
        assert_eq!(first.box_quantity, 8);
        assert_eq!(first.pairs_per_box, 12);
        assert_eq!(first.total_pairs, 96);
        assert_eq!(first.last_updated, at(5));
        assert_eq!(first.product_name, "Runner SKU-1");
        assert_eq!(first.status, StockStatus::InStock);

        let second = &summaries[1];
        assert_eq!(second.box_quantity, 10);
        assert_eq!(second.total_pairs, 60);
    }

    #[test]
    fn status_steps_at_zero_and_threshold() {
        assert_eq!(stock_status(0, LOW_STOCK_THRESHOLD), StockStatus::OutOfStock);
        for quantity in 1..5 {
            assert_eq!(stock_status(quantity, LOW_STOCK_THRESHOLD), StockStatus::LowStock);
        }
        assert_eq!(stock_status(5, LOW_STOCK_THRESHOLD), StockStatus::InStock);
        assert_eq!(stock_status(5, 10), StockStatus::LowStock);
    }

    #[test]
    fn unknown_products_get_sentinel_names() {
        let records = vec![
            record("r1", "ghost", "SKU-X", 2, at(2)),
            record("r2", "", "SKU-Y", 0, at(2)),
        ];

        let summaries = summarize(&records, &[]);

        assert_eq!(summaries[0].product_name, "Unknown Product (ID: ghost)");
        assert_eq!(summaries[0].category, "Unknown");
        assert_eq!(summaries[0].pairs_per_box, 0);
        assert_eq!(summaries[0].total_pairs, 0);
        assert_eq!(summaries[0].status, StockStatus::LowStock);
        assert_eq!(summaries[1].product_name, "Unknown Product (No ID)");
        assert_eq!(summaries[1].status, StockStatus::OutOfStock);
    }

    #[test]
    fn pairs_per_box_follows_current_catalog() {
        let mut record = record("r1", "p1", "SKU-1", 2, at(2));
        record.total_units = 24;
        let products = vec![product("p1", "SKU-1", 18)];

        let summaries = summarize(&[record.clone()], &products);

        assert_eq!(record.total_units, 24);
        assert_eq!(summaries[0].pairs_per_box, 18);
        assert_eq!(summaries[0].total_pairs, 36);
    }

    #[test]
    fn shared_sku_merges_and_is_reported() {
        let products = vec![product("p1", "SKU-1", 12), product("p2", "SKU-1", 24)];
        let records = vec![
            record("r1", "p1", "SKU-1", 2, at(2)),
            record("r2", "p2", "SKU-1", 3, at(3)),
        ];

        let summaries = summarize(&records, &products);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].product_id, "p1");
        assert_eq!(summaries[0].box_quantity, 5);
        // seeded from the first record's product
        assert_eq!(summaries[0].total_pairs, 60);

        assert_eq!(
            find_sku_conflicts(&records),
            vec![SkuConflict {
                sku: "SKU-1".to_string(),
                product_ids: vec!["p1".to_string(), "p2".to_string()],
            }]
        );
    }

    #[test]
    fn huge_quantities_saturate_instead_of_wrapping() {
        let products = vec![product("p1", "SKU-1", 12)];
        let records = vec![
            record("r1", "p1", "SKU-1", i64::MAX / 2 + 1, at(2)),
            record("r2", "p1", "SKU-1", i64::MAX / 2 + 1, at(3)),
        ];

        let summaries = summarize(&records, &products);

        assert_eq!(summaries[0].box_quantity, i64::MAX);
        assert_eq!(summaries[0].total_pairs, i64::MAX);
        assert_eq!(summaries[0].status, StockStatus::InStock);

        let single = summarize(&records[..1], &products);
        assert_eq!(single[0].total_pairs, i64::MAX);
    }

    #[test]
    fn empty_input_yields_no_summaries() {
        assert!(summarize(&[], &[]).is_empty());
        assert!(find_sku_conflicts(&[]).is_empty());
    }
}
