//! Validation of a single incoming box stock entry against a catalog snapshot.

use crate::{
    errors::validation_error::{ValidationError, ValidationWarning},
    models::{
        import_model::{RawImportEntry, RawQuantity, ValidatedImportEntry},
        product_model::Product,
    },
};

/// Quantities above this many boxes are accepted with a warning.
pub const LARGE_QUANTITY_WARNING_BOXES: i64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub entry: ValidatedImportEntry,
    pub warnings: Vec<ValidationWarning>,
}

/// Checks run in a fixed order. Missing fields are all collected before the
/// product lookup so one call can report several problems; every later
/// check stops at the first failure.
pub fn validate_entry(
    raw: &RawImportEntry,
    products: &[Product],
) -> Result<ValidatedEntry, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let product_id = raw
        .product_id
        .as_deref()
        .filter(|id| !id.trim().is_empty());
    if product_id.is_none() {
        errors.push(ValidationError::MissingProductId);
    }

    if raw.boxes_received.is_none() {
        errors.push(ValidationError::MissingBoxesReceived);
    }

    let supplier_name = raw
        .supplier_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    if supplier_name.is_none() {
        errors.push(ValidationError::MissingSupplierName);
    }

    let (Some(product_id), Some(quantity), Some(supplier_name)) =
        (product_id, raw.boxes_received.as_ref(), supplier_name)
    else {
        return Err(errors);
    };

    let Some(product) = products.iter().find(|p| p.id == product_id) else {
        return Err(vec![ValidationError::ProductNotFound {
            id: product_id.to_string(),
        }]);
    };

    let boxes_received = coerce_quantity(quantity).map_err(|err| vec![err])?;

    if boxes_received <= 0 {
        return Err(vec![ValidationError::NonPositiveBoxesReceived]);
    }

    let box_contents = i64::from(product.box_contents);
    let total_units = boxes_received
        .checked_mul(box_contents)
        .ok_or_else(|| vec![ValidationError::BoxesReceivedTooLarge])?;

    let mut warnings = Vec::new();
    if boxes_received > LARGE_QUANTITY_WARNING_BOXES {
        warnings.push(ValidationWarning::LargeQuantity { boxes: boxes_received });
    }
    if !product.has_valid_box_contents() {
        warnings.push(ValidationWarning::MisconfiguredBoxContents {
            name: product.name.clone(),
            box_contents: product.box_contents,
        });
    }

    let entry = ValidatedImportEntry {
        product_id: product_id.to_string(),
        boxes_received,
        supplier_name: supplier_name.to_string(),
        description: raw
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        product_name: product.name.clone(),
        sku: product.sku.clone(),
        box_contents,
        total_units,
    };

    Ok(ValidatedEntry { entry, warnings })
}

/// Native numbers truncate toward zero; text takes its leading integer the
/// way spreadsheet users expect ("12 boxes" is 12). Values outside `i64`
/// are rejected, never saturated.
fn coerce_quantity(quantity: &RawQuantity) -> Result<i64, ValidationError> {
    match quantity {
        RawQuantity::Integer(n) => Ok(*n),
        RawQuantity::Number(n) if !n.is_finite() => Err(ValidationError::InvalidBoxesReceived),
        RawQuantity::Number(n) => {
            let truncated = n.trunc();
            // i64::MAX as f64 rounds up to 2^63, which is already out of range
            if truncated >= i64::MAX as f64 || truncated < i64::MIN as f64 {
                Err(ValidationError::BoxesReceivedTooLarge)
            } else {
                Ok(truncated as i64)
            }
        }
        RawQuantity::Text(text) => parse_leading_int(text),
    }
}

fn parse_leading_int(text: &str) -> Result<i64, ValidationError> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(ValidationError::InvalidBoxesReceived);
    }

    let value: i64 = digits[..end]
        .parse()
        .map_err(|_| ValidationError::BoxesReceivedTooLarge)?;
    Ok(if negative { -value } else { value })
}
