use std::path::Path;

use serde::{Deserialize, Serialize};

/// A spreadsheet cell after parsing, before any field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as text; integral numbers drop their fractional part.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(text) if text.is_empty() => None,
            RawCell::Text(text) => Some(text.clone()),
            RawCell::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            RawCell::Number(n) => Some(n.to_string()),
            RawCell::Bool(b) => Some(b.to_string()),
        }
    }

    pub fn as_quantity(&self) -> Option<RawQuantity> {
        match self {
            RawCell::Number(n) => Some(RawQuantity::Number(*n)),
            other => other.as_text().map(RawQuantity::Text),
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(value.to_string())
        }
    }
}

/// Quantity as supplied by the caller: an integer, a spreadsheet number or
/// free text. `Integer` is tried first when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuantity {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl From<i64> for RawQuantity {
    fn from(value: i64) -> Self {
        RawQuantity::Integer(value)
    }
}

impl From<&str> for RawQuantity {
    fn from(value: &str) -> Self {
        RawQuantity::Text(value.to_string())
    }
}

/// Typed candidate entry, built from a spreadsheet row or a form submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImportEntry {
    pub product_id: Option<String>,
    pub boxes_received: Option<RawQuantity>,
    pub supplier_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedImportEntry {
    pub product_id: String,
    pub boxes_received: i64,
    pub supplier_name: String,
    pub description: String,
    pub product_name: String,
    pub sku: String,
    pub box_contents: i64,
    pub total_units: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPreviewRow {
    /// 1-based position in the entry list.
    pub index: usize,
    #[serde(flatten)]
    pub entry: ValidatedImportEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub entries: Vec<ValidatedImportEntry>,
    /// Display list, capped with a trailing "...and N more warnings" line.
    pub warnings: Vec<String>,
    pub total_warnings: usize,
    pub preview: Vec<ImportPreviewRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Xlsx,
    Xls,
    Csv,
}

impl ImportFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" => Some(ImportFormat::Xlsx),
            "xls" => Some(ImportFormat::Xls),
            "csv" => Some(ImportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewImportRequest {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitImportRequest {
    pub entries: Vec<ValidatedImportEntry>,
    #[serde(default)]
    pub creator_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitImportResponse {
    pub created: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTemplateResponse {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(RawCell::Number(5.0).as_text().as_deref(), Some("5"));
        assert_eq!(RawCell::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(RawCell::Text(String::new()).as_text(), None);
    }

    #[test]
    fn integer_quantities_keep_full_precision() {
        let big = i64::MAX - 1;
        assert_eq!(RawQuantity::from(big), RawQuantity::Integer(big));

        let parsed: RawQuantity = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(parsed, RawQuantity::Integer(9_007_199_254_740_993));
        let fractional: RawQuantity = serde_json::from_str("2.5").unwrap();
        assert_eq!(fractional, RawQuantity::Number(2.5));
        let text: RawQuantity = serde_json::from_str("\"12 boxes\"").unwrap();
        assert_eq!(text, RawQuantity::Text("12 boxes".to_string()));
    }

    #[test]
    fn format_is_detected_case_insensitively() {
        assert_eq!(ImportFormat::from_file_name("stock.XLSX"), Some(ImportFormat::Xlsx));
        assert_eq!(ImportFormat::from_file_name("legacy.xls"), Some(ImportFormat::Xls));
        assert_eq!(ImportFormat::from_file_name("export.csv"), Some(ImportFormat::Csv));
        assert_eq!(ImportFormat::from_file_name("notes.txt"), None);
        assert_eq!(ImportFormat::from_file_name("no_extension"), None);
    }
}
