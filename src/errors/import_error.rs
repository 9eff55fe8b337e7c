use thiserror::Error;

/// Conditions that abort a whole spreadsheet import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid file format. Please upload an Excel file (.xlsx or .xls) or a CSV file.")]
    InvalidFormat { file_name: String },

    #[error("File is too large. Maximum file size is {}MB.", .max_bytes / (1024 * 1024))]
    FileTooLarge { size: u64, max_bytes: u64 },

    #[error("Error reading the file. Please try again with a different file.")]
    Read(#[from] std::io::Error),

    #[error("Could not parse the Excel file. The file might be corrupted or in an unsupported format.")]
    Unparseable { reason: String },

    #[error("Excel file contains no sheets.")]
    NoSheets,

    #[error("The Excel file does not contain enough data. Please use the template format.")]
    NotEnoughData,

    #[error("Missing required columns: {}. Please use the template format.", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("The Excel file contains headers but no data rows.")]
    NoDataRows,

    #[error("No valid entries found in the Excel file. Please check the data format and ensure all required fields are filled correctly.")]
    NoValidEntries { warnings: Vec<String> },

    #[error("Failed to generate Excel template. Please try again.")]
    Template(#[from] rust_xlsxwriter::XlsxError),
}

impl ImportError {
    pub(crate) fn unparseable(reason: impl ToString) -> Self {
        ImportError::Unparseable {
            reason: reason.to_string(),
        }
    }
}
