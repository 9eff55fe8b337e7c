use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{incoming_box_stock_model::IncomingBoxStock, product_model::Product};

/// Keeps records whose SKU or product name contains `query`, ignoring case.
pub fn filter_box_stocks<'a>(
    records: &'a [IncomingBoxStock],
    products: &[Product],
    query: &str,
) -> Vec<&'a IncomingBoxStock> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    let names: HashMap<&str, String> = products
        .iter()
        .map(|p| (p.id.as_str(), p.name.to_lowercase()))
        .collect();

    records
        .iter()
        .filter(|record| {
            record.sku.to_lowercase().contains(&needle)
                || names
                    .get(record.product_id.as_str())
                    .is_some_and(|name| name.contains(&needle))
        })
        .collect()
}

/// SKU lookahead for the entry form. A blank query matches nothing.
pub fn search_products_by_sku<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    products
        .iter()
        .filter(|p| p.sku.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    IncomingDate,
    Sku,
    CreatorId,
    SupplierName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Stable sort of the record table by one column.
pub fn sort_box_stocks(records: &mut [IncomingBoxStock], field: SortField, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &IncomingBoxStock, b: &IncomingBoxStock, field: SortField) -> Ordering {
    match field {
        SortField::IncomingDate => a.incoming_date.cmp(&b.incoming_date),
        SortField::Sku => a.sku.to_lowercase().cmp(&b.sku.to_lowercase()),
        SortField::CreatorId => a
            .creator_id
            .as_deref()
            .unwrap_or_default()
            .cmp(b.creator_id.as_deref().unwrap_or_default()),
        SortField::SupplierName => a
            .supplier_name
            .to_lowercase()
            .cmp(&b.supplier_name.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, sku: &str, name: &str) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: id.to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            price: 10.0,
            box_contents: 12,
            category: "Boots".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn record(id: &str, product_id: &str, sku: &str, supplier: &str, day: u32) -> IncomingBoxStock {
        let at = Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap();
        IncomingBoxStock {
            id: id.to_string(),
            incoming_date: at,
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            boxes_received: 1,
            supplier_name: supplier.to_string(),
            description: None,
            total_units: 12,
            creator_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn search_matches_sku_or_product_name() {
        let products = vec![
            product("p1", "SNK-001", "Canvas Sneaker"),
            product("p2", "BT-001", "Chelsea Boot"),
        ];
        let records = vec![
            record("r1", "p1", "SNK-001", "Acme", 1),
            record("r2", "p2", "BT-001", "Bata", 2),
        ];

        let by_sku: Vec<_> = filter_box_stocks(&records, &products, "snk").into_iter().map(|r| r.id.as_str()).collect();
        assert_eq!(by_sku, vec!["r1"]);

        let by_name: Vec<_> = filter_box_stocks(&records, &products, "CHELSEA").into_iter().map(|r| r.id.as_str()).collect();
        assert_eq!(by_name, vec!["r2"]);

        assert_eq!(filter_box_stocks(&records, &products, "  ").len(), 2);
        assert!(filter_box_stocks(&records, &products, "sandal").is_empty());
    }

    #[test]
    fn sku_lookahead_ignores_blank_query() {
        let products = vec![product("p1", "SNK-001", "Canvas"), product("p2", "SNK-002", "Leather")];
        assert!(search_products_by_sku(&products, " ").is_empty());
        assert_eq!(search_products_by_sku(&products, "snk-00").len(), 2);
        assert_eq!(search_products_by_sku(&products, "002")[0].id, "p2");
    }

    #[test]
    fn sorting_by_supplier_is_case_insensitive() {
        let mut records = vec![
            record("r1", "p1", "A", "zeta", 3),
            record("r2", "p1", "B", "Alpha", 1),
            record("r3", "p1", "C", "beta", 2),
        ];

        sort_box_stocks(&mut records, SortField::SupplierName, SortDirection::Asc);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r3", "r1"]);

        sort_box_stocks(&mut records, SortField::IncomingDate, SortDirection::Asc.toggled());
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r3", "r2"]);
    }
}
