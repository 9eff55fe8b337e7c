//! Spreadsheet import of incoming box stock.
//!
//! Fatal problems with the file itself abort the import with an
//! [`ImportError`]. Problems with individual rows only skip that row and are
//! reported as `Row N: ...` warnings next to the entries that did validate.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info, warn};

use crate::{
    errors::import_error::ImportError,
    models::{
        import_model::{ImportFormat, ImportOutcome, ImportPreviewRow, RawCell, RawImportEntry, ValidatedImportEntry},
        product_model::Product,
    },
    services::validation_service::validate_entry,
};

pub const TEMPLATE_HEADERS: [&str; 6] = [
    "Product ID",
    "Product SKU",
    "Product Name",
    "Boxes Received",
    "Supplier Name",
    "Description (Optional)",
];

pub const REQUIRED_HEADERS: [&str; 3] = ["Product ID", "Boxes Received", "Supplier Name"];

const REFERENCE_HEADERS: [&str; 4] = ["Product ID", "SKU", "Name", "Box Contents"];
const TEMPLATE_COLUMN_WIDTHS: [f64; 6] = [36.0, 15.0, 30.0, 15.0, 20.0, 30.0];
const REFERENCE_COLUMN_WIDTHS: [f64; 4] = [36.0, 15.0, 30.0, 15.0];
const TEMPLATE_SAMPLE_PRODUCTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    pub max_file_size_bytes: u64,
    pub max_displayed_warnings: usize,
    pub preview_rows: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024,
            max_displayed_warnings: 5,
            preview_rows: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BulkImportService {
    limits: ImportLimits,
}

impl BulkImportService {
    pub fn new(limits: ImportLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ImportLimits {
        self.limits
    }

    /// Two-sheet xlsx workbook: the fill-in template and a product reference.
    pub fn generate_template(&self, products: &[Product]) -> Result<Vec<u8>, ImportError> {
        let header_format = Format::new().set_bold();

        let mut template = Worksheet::new();
        template.set_name("Box Stock Template")?;
        write_rows(&mut template, &template_rows(products), &header_format)?;
        for (col, width) in TEMPLATE_COLUMN_WIDTHS.iter().enumerate() {
            template.set_column_width(col as u16, *width)?;
        }

        let mut reference = Worksheet::new();
        reference.set_name("Product Reference")?;
        write_rows(&mut reference, &reference_rows(products), &header_format)?;
        for (col, width) in REFERENCE_COLUMN_WIDTHS.iter().enumerate() {
            reference.set_column_width(col as u16, *width)?;
        }

        let mut workbook = Workbook::new();
        workbook.push_worksheet(template);
        workbook.push_worksheet(reference);
        let buffer = workbook.save_to_buffer()?;

        info!("Generated import template for {} products", products.len());
        Ok(buffer)
    }

    pub async fn process_path(
        &self,
        path: impl AsRef<Path>,
        products: &[Product],
    ) -> Result<ImportOutcome, ImportError> {
        let path = path.as_ref();
        let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();

        // Format is judged from the name alone, before touching the disk.
        check_format(file_name)?;
        let size = tokio::fs::metadata(path).await?.len();
        self.check_file(file_name, size)?;

        let bytes = tokio::fs::read(path).await?;
        self.process_file(&bytes, file_name, size, products)
    }

    pub fn process_file(
        &self,
        bytes: &[u8],
        file_name: &str,
        file_size: u64,
        products: &[Product],
    ) -> Result<ImportOutcome, ImportError> {
        let format = self.check_file(file_name, file_size)?;

        let rows = parse_rows(format, bytes)?;
        if rows.len() < 2 {
            return Err(ImportError::NotEnoughData);
        }

        let columns = ColumnMap::resolve(&rows[0])?;

        let data_rows: Vec<&Vec<RawCell>> = rows[1..]
            .iter()
            .filter(|row| !row.iter().all(RawCell::is_empty))
            .collect();
        if data_rows.is_empty() {
            return Err(ImportError::NoDataRows);
        }

        let mut entries: Vec<ValidatedImportEntry> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        for (i, row) in data_rows.iter().enumerate() {
            // +2: 1-based numbering plus the header row
            let row_number = i + 2;
            match validate_entry(&columns.raw_entry(row), products) {
                Ok(validated) => {
                    warnings.extend(
                        validated
                            .warnings
                            .iter()
                            .map(|warning| format!("Row {}: {}", row_number, warning)),
                    );
                    entries.push(validated.entry);
                }
                Err(errors) => {
                    let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
                    debug!("Skipping row {}: {}", row_number, reasons.join(", "));
                    warnings.push(format!("Row {}: {}", row_number, reasons.join(", ")));
                }
            }
        }

        if entries.is_empty() {
            warn!("Import of {} produced no valid entries", file_name);
            return Err(ImportError::NoValidEntries { warnings });
        }

        info!(
            "Processed {}: {} valid entries, {} warnings",
            file_name,
            entries.len(),
            warnings.len()
        );

        let preview = entries
            .iter()
            .take(self.limits.preview_rows)
            .enumerate()
            .map(|(i, entry)| ImportPreviewRow {
                index: i + 1,
                entry: entry.clone(),
            })
            .collect();
        let total_warnings = warnings.len();

        Ok(ImportOutcome {
            entries,
            warnings: cap_warnings(warnings, self.limits.max_displayed_warnings),
            total_warnings,
            preview,
        })
    }

    fn check_file(&self, file_name: &str, file_size: u64) -> Result<ImportFormat, ImportError> {
        let format = check_format(file_name)?;

        if file_size > self.limits.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size: file_size,
                max_bytes: self.limits.max_file_size_bytes,
            });
        }

        Ok(format)
    }
}

fn check_format(file_name: &str) -> Result<ImportFormat, ImportError> {
    ImportFormat::from_file_name(file_name).ok_or_else(|| ImportError::InvalidFormat {
        file_name: file_name.to_string(),
    })
}

/// Header plus up to three catalog samples, or one synthetic sample for an
/// empty catalog.
pub fn template_rows(products: &[Product]) -> Vec<Vec<String>> {
    let mut rows = vec![TEMPLATE_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];

    if products.is_empty() {
        rows.push(
            [
                "product-id-example",
                "SKU-123",
                "Product Name Example",
                "5",
                "Supplier Name Example",
                "Optional description",
            ]
            .iter()
            .map(|cell| cell.to_string())
            .collect(),
        );
        return rows;
    }

    rows.extend(products.iter().take(TEMPLATE_SAMPLE_PRODUCTS).map(|product| {
        vec![
            product.id.clone(),
            product.sku.clone(),
            product.name.clone(),
            "5".to_string(),
            "Supplier Name".to_string(),
            "Optional description".to_string(),
        ]
    }));
    rows
}

fn reference_rows(products: &[Product]) -> Vec<Vec<String>> {
    let mut rows = vec![REFERENCE_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    rows.extend(products.iter().map(|product| {
        vec![
            product.id.clone(),
            product.sku.clone(),
            product.name.clone(),
            product.box_contents.to_string(),
        ]
    }));
    rows
}

fn write_rows(sheet: &mut Worksheet, rows: &[Vec<String>], header_format: &Format) -> Result<(), ImportError> {
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if r == 0 {
                sheet.write_string_with_format(r as u32, c as u16, value, header_format)?;
            } else {
                sheet.write_string(r as u32, c as u16, value)?;
            }
        }
    }
    Ok(())
}

fn cap_warnings(mut warnings: Vec<String>, max: usize) -> Vec<String> {
    if warnings.len() > max {
        let remaining = warnings.len() - max;
        warnings.truncate(max);
        warnings.push(format!("...and {} more warnings", remaining));
    }
    warnings
}

fn parse_rows(format: ImportFormat, bytes: &[u8]) -> Result<Vec<Vec<RawCell>>, ImportError> {
    match format {
        ImportFormat::Xlsx | ImportFormat::Xls => parse_workbook(bytes),
        ImportFormat::Csv => parse_csv(bytes),
    }
}

/// Reads the first sheet of an Excel workbook.
fn parse_workbook(bytes: &[u8]) -> Result<Vec<Vec<RawCell>>, ImportError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(ImportError::unparseable)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(ImportError::unparseable)?,
        None => return Err(ImportError::NoSheets),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<Vec<RawCell>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(ImportError::unparseable)?;
        rows.push(record.iter().map(RawCell::from).collect());
    }
    Ok(rows)
}

fn cell_from_data(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(text) => RawCell::from(text.as_str()),
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Float(n) => RawCell::Number(*n),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => RawCell::from(text.as_str()),
        Data::Error(err) => RawCell::Text(err.to_string()),
    }
}

/// Column positions resolved from the header row by case-insensitive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    product_id: usize,
    boxes_received: usize,
    supplier_name: usize,
    description: Option<usize>,
}

impl ColumnMap {
    fn resolve(header: &[RawCell]) -> Result<Self, ImportError> {
        let labels: Vec<Option<String>> = header
            .iter()
            .map(|cell| cell.as_text().map(|text| text.to_lowercase()))
            .collect();
        let find = |name: &str| {
            let name = name.to_lowercase();
            labels.iter().position(|label| label.as_deref() == Some(name.as_str()))
        };

        let missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .filter(|&&header| find(header).is_none())
            .map(|header| header.to_string())
            .collect();

        match (find("Product ID"), find("Boxes Received"), find("Supplier Name")) {
            (Some(product_id), Some(boxes_received), Some(supplier_name)) => Ok(ColumnMap {
                product_id,
                boxes_received,
                supplier_name,
                description: find("Description (Optional)"),
            }),
            _ => Err(ImportError::MissingColumns { columns: missing }),
        }
    }

    fn raw_entry(&self, row: &[RawCell]) -> RawImportEntry {
        let text = |index: usize| row.get(index).and_then(RawCell::as_text);
        RawImportEntry {
            product_id: text(self.product_id),
            boxes_received: row.get(self.boxes_received).and_then(RawCell::as_quantity),
            supplier_name: text(self.supplier_name),
            description: self.description.and_then(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, sku: &str, box_contents: i32) -> Product {
        Product {
            id: id.to_string(),
            sku: sku.to_string(),
            name: format!("Sneaker {}", sku),
            price: 55.0,
            box_contents,
            category: "Sneakers".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn process_csv(csv: &str, products: &[Product]) -> Result<ImportOutcome, ImportError> {
        BulkImportService::default().process_file(csv.as_bytes(), "stock.csv", csv.len() as u64, products)
    }

    #[test]
    fn mixed_validity_keeps_good_rows() {
        let catalog = vec![product("p1", "SKU-1", 12)];
        let outcome = process_csv(
            "Product ID,Boxes Received,Supplier Name\np1,5,Acme\np-missing,3,Acme\n",
            &catalog,
        )
        .unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].boxes_received, 5);
        assert_eq!(outcome.entries[0].total_units, 60);
        assert_eq!(
            outcome.warnings,
            vec!["Row 3: Product with ID p-missing not found in the database".to_string()]
        );
        assert_eq!(outcome.preview[0].index, 1);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let catalog = vec![product("p1", "SKU-1", 6)];
        let outcome = process_csv(
            "supplier name,PRODUCT ID,boxes received,description (optional)\nAcme,p1,2, first drop \n",
            &catalog,
        )
        .unwrap();

        assert_eq!(outcome.entries[0].supplier_name, "Acme");
        assert_eq!(outcome.entries[0].description, "first drop");
        assert_eq!(outcome.entries[0].total_units, 12);
    }

    #[test]
    fn missing_required_columns_are_named() {
        let err = process_csv("Product ID,Quantity\np1,5\n", &[]).unwrap_err();
        match err {
            ImportError::MissingColumns { columns } => {
                assert_eq!(columns, vec!["Boxes Received".to_string(), "Supplier Name".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_checks_run_before_parsing() {
        let service = BulkImportService::default();
        assert!(matches!(
            service.process_file(b"", "stock.pdf", 10, &[]),
            Err(ImportError::InvalidFormat { .. })
        ));
        assert!(matches!(
            service.process_file(b"", "stock.xlsx", 10 * 1024 * 1024 + 1, &[]),
            Err(ImportError::FileTooLarge { .. })
        ));
        assert!(matches!(
            service.process_file(b"not a workbook", "stock.xlsx", 14, &[]),
            Err(ImportError::Unparseable { .. })
        ));
    }

    #[test]
    fn header_only_files_are_rejected() {
        assert!(matches!(
            process_csv("Product ID,Boxes Received,Supplier Name\n", &[]),
            Err(ImportError::NotEnoughData)
        ));
        assert!(matches!(
            process_csv("Product ID,Boxes Received,Supplier Name\n,,\n,,\n", &[]),
            Err(ImportError::NoDataRows)
        ));
    }

    #[test]
    fn all_rows_invalid_is_fatal() {
        let err = process_csv("Product ID,Boxes Received,Supplier Name\np1,0,Acme\n,4,\n", &[product("p1", "SKU-1", 12)])
            .unwrap_err();
        match err {
            ImportError::NoValidEntries { warnings } => assert_eq!(
                warnings,
                vec![
                    "Row 2: Boxes received must be a positive number".to_string(),
                    "Row 3: Product ID is required and must be a valid string, Supplier name is required and cannot be empty"
                        .to_string(),
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_rows_are_skipped_before_numbering() {
        let catalog = vec![product("p1", "SKU-1", 12)];
        let outcome = process_csv(
            "Product ID,Boxes Received,Supplier Name\np1,1,Acme\n,,\np1,2000,Acme\n",
            &catalog,
        )
        .unwrap();

        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(
            outcome.warnings,
            vec!["Row 3: Unusually large quantity (2000 boxes). Please verify.".to_string()]
        );
    }

    #[test]
    fn warnings_are_capped_with_summary_line() {
        let catalog = vec![product("p1", "SKU-1", 12)];
        let mut csv = String::from("Product ID,Boxes Received,Supplier Name\np1,1,Acme\n");
        for _ in 0..8 {
            csv.push_str("ghost,1,Acme\n");
        }

        let outcome = process_csv(&csv, &catalog).unwrap();

        assert_eq!(outcome.total_warnings, 8);
        assert_eq!(outcome.warnings.len(), 6);
        assert_eq!(outcome.warnings[0], "Row 3: Product with ID ghost not found in the database");
        assert_eq!(outcome.warnings[5], "...and 3 more warnings");
    }

    #[test]
    fn preview_is_limited_to_first_rows() {
        let catalog = vec![product("p1", "SKU-1", 12)];
        let mut csv = String::from("Product ID,Boxes Received,Supplier Name\n");
        for n in 1..=12 {
            csv.push_str(&format!("p1,{},Acme\n", n));
        }

        let outcome = process_csv(&csv, &catalog).unwrap();

        assert_eq!(outcome.entries.len(), 12);
        assert_eq!(outcome.preview.len(), 10);
        assert_eq!(outcome.preview[9].index, 10);
        assert_eq!(outcome.preview[9].entry.boxes_received, 10);
    }

    #[test]
    fn empty_catalog_template_has_one_sample_row() {
        let rows = template_rows(&[]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TEMPLATE_HEADERS.map(String::from).to_vec());
        assert_eq!(rows[1][0], "product-id-example");
    }

    #[test]
    fn template_samples_at_most_three_products() {
        let catalog: Vec<Product> = (1..=5).map(|n| product(&format!("p{n}"), &format!("SKU-{n}"), 12)).collect();
        let rows = template_rows(&catalog);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3][1], "SKU-3");
        assert_eq!(reference_rows(&catalog).len(), 6);
    }

    #[test]
    fn generated_template_imports_cleanly() {
        let service = BulkImportService::default();
        let catalog = vec![product("p1", "SKU-1", 12), product("p2", "SKU-2", 6)];

        let bytes = service.generate_template(&catalog).unwrap();
        let outcome = service
            .process_file(&bytes, "box_stock_import_template.xlsx", bytes.len() as u64, &catalog)
            .unwrap();

        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].supplier_name, "Supplier Name");
        assert_eq!(outcome.entries[1].total_units, 30);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn workbook_numbers_are_read_as_quantities() {
        let mut sheet = Worksheet::new();
        sheet.write_string(0, 0, "Product ID").unwrap();
        sheet.write_string(0, 1, "Boxes Received").unwrap();
        sheet.write_string(0, 2, "Supplier Name").unwrap();
        sheet.write_string(1, 0, "p1").unwrap();
        sheet.write_number(1, 1, 7.0).unwrap();
        sheet.write_string(1, 2, "Acme").unwrap();
        let mut workbook = Workbook::new();
        workbook.push_worksheet(sheet);
        let bytes = workbook.save_to_buffer().unwrap();

        let outcome = BulkImportService::default()
            .process_file(&bytes, "upload.xlsx", bytes.len() as u64, &[product("p1", "SKU-1", 12)])
            .unwrap();

        assert_eq!(outcome.entries[0].boxes_received, 7);
        assert_eq!(outcome.entries[0].total_units, 84);
    }

    #[test]
    fn path_import_reports_read_failures() {
        let service = BulkImportService::default();
        let result = tokio_test::block_on(service.process_path("/nonexistent/dir/stock.xlsx", &[]));
        assert!(matches!(result, Err(ImportError::Read(_))));
    }

    #[test]
    fn path_import_rejects_format_before_reading() {
        let service = BulkImportService::default();
        let result = tokio_test::block_on(service.process_path("/nonexistent/dir/notes.pdf", &[]));
        assert!(matches!(result, Err(ImportError::InvalidFormat { .. })));
    }
}
