//! # Bulk Import Sheets
//!
//! Reading uploaded CSV files into rows, and the error reports produced when
//! rows fail validation. Writing the rows is the database layer's job; it
//! runs every row of an upload in one transaction.
//!
//! ## Upload Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upload name ── check_upload_name ── .csv? ─ no ─► ImportError          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bytes ── Sheet::from_csv ── headers normalised (" Issue Date" →       │
//! │       │                      "issue_date")                              │
//! │       ▼                                                                 │
//! │  Sheet::require_columns ── exact count and names ─ no ─► ImportError   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rows (file row numbers, header = 1) ── tally-db validates + writes    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  any RowError? ── yes ─► rollback, ImportError::Rows(all errors)       │
//! │       │                                                                 │
//! │       ▼ no                                                              │
//! │  commit, ImportSummary { created }                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError, ValidationErrors, GENERAL_FIELD};
use crate::money::Money;
use crate::validation::amount_in_range;

// =============================================================================
// Upload Kinds
// =============================================================================

/// Columns of a client or supplier sheet.
pub const PERSON_COLUMNS: &[&str] = &["tax_number", "name", "address", "email", "phone"];

/// Columns of a sale invoice sheet. One row per invoice line.
pub const SALE_INVOICE_COLUMNS: &[&str] = &[
    "issue_date",
    "type",
    "point_of_sell",
    "number",
    "sender",
    "recipient",
    "payment_method",
    "payment_term",
    "description",
    "taxable_amount",
    "not_taxable_amount",
    "vat_amount",
];

/// Columns of a sale receipt sheet. `ri_*` identify the related invoice.
pub const SALE_RECEIPT_COLUMNS: &[&str] = &[
    "issue_date",
    "point_of_sell",
    "number",
    "sender",
    "recipient",
    "description",
    "total_amount",
    "ri_type",
    "ri_pos",
    "ri_number",
];

/// What an upload contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Clients,
    Suppliers,
    SaleInvoices,
    SaleReceipts,
}

impl ImportKind {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ImportKind::Clients | ImportKind::Suppliers => PERSON_COLUMNS,
            ImportKind::SaleInvoices => SALE_INVOICE_COLUMNS,
            ImportKind::SaleReceipts => SALE_RECEIPT_COLUMNS,
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImportKind::Clients => "clients",
            ImportKind::Suppliers => "suppliers",
            ImportKind::SaleInvoices => "sale_invoices",
            ImportKind::SaleReceipts => "sale_receipts",
        })
    }
}

/// Result of a committed upload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportSummary {
    pub kind: ImportKind,
    /// Records created: persons, invoices (not lines) or receipts.
    pub created: usize,
}

// =============================================================================
// Errors
// =============================================================================

/// A failure attributed to one row of the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// A field or rule failed on the row.
    Field {
        row: usize,
        field: String,
        message: String,
    },
    /// A business key in the row matches no stored record.
    MissingReference { row: usize, column: String },
}

impl RowError {
    pub fn field(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        RowError::Field {
            row,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing_reference(row: usize, column: impl Into<String>) -> Self {
        RowError::MissingReference {
            row,
            column: column.into(),
        }
    }

    /// One error per failed field.
    pub fn from_validation(row: usize, errors: &ValidationErrors) -> Vec<RowError> {
        errors
            .iter()
            .map(|e| RowError::field(row, e.field(), e.to_string()))
            .collect()
    }

    /// One error per message of a rule violation.
    pub fn from_core(row: usize, err: &CoreError) -> Vec<RowError> {
        err.messages()
            .into_iter()
            .map(|(field, message)| RowError::field(row, field, message))
            .collect()
    }

    /// A rule that spans several fields.
    pub fn general(row: usize, message: impl Into<String>) -> Self {
        RowError::field(row, GENERAL_FIELD, message)
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::Field {
                row,
                field,
                message,
            } => write!(f, "Row {}, {}: {}", row, field, message),
            RowError::MissingReference { row, column } => write!(
                f,
                "The input in row {} and column {} doesn't exist in the records.",
                row, column
            ),
        }
    }
}

/// Why an upload was rejected. Nothing is written in any case.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// Not a CSV name.
    #[error("{0} has the wrong extension.")]
    InvalidFile(String),

    /// Excel workbooks are recognised but not read.
    #[error("{0} is a spreadsheet workbook; export it as CSV and upload it again.")]
    UnsupportedSpreadsheet(String),

    /// The bytes are not readable CSV.
    #[error("The file could not be read: {0}")]
    Malformed(String),

    /// Header does not match the expected set.
    #[error("The file must have exactly these columns: {}", .expected.join(", "))]
    WrongColumns { expected: Vec<String> },

    /// The header is fine but the file has no data rows.
    #[error("The file has no rows.")]
    Empty,

    /// One or more rows failed; every message is kept.
    #[error("{} row error(s)", .0.len())]
    Rows(Vec<RowError>),
}

impl ImportError {
    /// Messages to report to the uploader.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ImportError::Rows(rows) => rows.iter().map(|r| r.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}

// =============================================================================
// File Checks
// =============================================================================

/// Accepts `.csv` names. Excel names get their own message.
pub fn check_upload_name(name: &str) -> Result<(), ImportError> {
    let lower = name.trim().to_lowercase();
    if lower.ends_with(".csv") {
        Ok(())
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        Err(ImportError::UnsupportedSpreadsheet(name.to_string()))
    } else {
        Err(ImportError::InvalidFile(name.to_string()))
    }
}

/// `" Issue Date "` → `"issue_date"`.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

// =============================================================================
// Sheet
// =============================================================================

/// A parsed upload: normalised headers plus raw, trimmed cells.
#[derive(Debug, Clone)]
pub struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Reads CSV bytes. The first record is the header.
    pub fn from_csv(bytes: &[u8]) -> Result<Sheet, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| ImportError::Malformed(e.to_string()))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ImportError::Malformed(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Sheet { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The header must hold exactly the expected columns, in any order.
    pub fn require_columns(&self, expected: &[&str]) -> Result<(), ImportError> {
        let matches = self.headers.len() == expected.len()
            && expected.iter().all(|c| self.headers.iter().any(|h| h == c));
        if !matches {
            return Err(ImportError::WrongColumns {
                expected: expected.iter().map(|c| c.to_string()).collect(),
            });
        }
        if self.rows.is_empty() {
            return Err(ImportError::Empty);
        }
        Ok(())
    }

    /// Data rows, numbered as in the file (the header is row 1).
    pub fn rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.rows.iter().enumerate().map(move |(index, cells)| SheetRow {
            number: index + 2,
            headers: &self.headers,
            cells,
        })
    }

    /// Runs of consecutive rows sharing the same values in `key_columns`.
    ///
    /// Sale invoice sheets carry one line per row; a run is one invoice.
    pub fn groups(&self, key_columns: &[&str]) -> Vec<Vec<SheetRow<'_>>> {
        let mut groups: Vec<Vec<SheetRow<'_>>> = Vec::new();
        for row in self.rows() {
            let same = groups
                .last()
                .and_then(|group| group.last())
                .map(|last| key_columns.iter().all(|c| last.get(c) == row.get(c)))
                .unwrap_or(false);
            match groups.last_mut() {
                Some(group) if same => group.push(row),
                _ => groups.push(vec![row]),
            }
        }
        groups
    }
}

/// One data row of a [`Sheet`].
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    /// Row number in the file.
    pub number: usize,
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> SheetRow<'a> {
    /// Cell of `column`; empty when the column or cell is missing.
    pub fn get(&self, column: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

// =============================================================================
// Cell Parsing
// =============================================================================

/// Dates are written `DD/MM/YYYY`; ISO `YYYY-MM-DD` is accepted too.
pub fn parse_date(field: &str, text: &str) -> Result<NaiveDate, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a DD/MM/YYYY date", text),
        })
}

/// Amounts are decimal text with at most two decimals.
pub fn parse_amount(field: &str, text: &str) -> Result<Money, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    let amount = text
        .parse::<Money>()
        .map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
    amount_in_range(field, amount.cents())?;
    Ok(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_upload_name() {
        assert!(check_upload_name("clients.csv").is_ok());
        assert!(check_upload_name("CLIENTS.CSV").is_ok());
        assert!(matches!(
            check_upload_name("clients.xlsx"),
            Err(ImportError::UnsupportedSpreadsheet(_))
        ));
        let err = check_upload_name("clients.txt").unwrap_err();
        assert_eq!(err.to_string(), "clients.txt has the wrong extension.");
    }

    #[test]
    fn test_headers_are_normalised() {
        let sheet = Sheet::from_csv(b" Tax Number ,NAME,Address,email,Phone\n1,a,b,c,2\n").unwrap();
        assert_eq!(
            sheet.headers(),
            &["tax_number", "name", "address", "email", "phone"]
        );
        assert!(sheet.require_columns(PERSON_COLUMNS).is_ok());
    }

    #[test]
    fn test_column_mismatch() {
        let sheet = Sheet::from_csv(b"tax_number,name,address,email\n1,a,b,c\n").unwrap();
        assert!(matches!(
            sheet.require_columns(PERSON_COLUMNS),
            Err(ImportError::WrongColumns { .. })
        ));

        let sheet =
            Sheet::from_csv(b"tax_number,name,address,email,mobile\n1,a,b,c,2\n").unwrap();
        assert!(sheet.require_columns(PERSON_COLUMNS).is_err());
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = Sheet::from_csv(b"tax_number,name,address,email,phone\n").unwrap();
        assert!(matches!(
            sheet.require_columns(PERSON_COLUMNS),
            Err(ImportError::Empty)
        ));
    }

    #[test]
    fn test_rows_are_numbered_like_the_file() {
        let sheet = Sheet::from_csv(b"a,b\n1,2\n3,4\n").unwrap();
        let rows: Vec<_> = sheet.rows().collect();
        assert_eq!(rows[0].number, 2);
        assert_eq!(rows[1].number, 3);
        assert_eq!(rows[1].get("b"), "4");
        assert_eq!(rows[1].get("missing"), "");
    }

    #[test]
    fn test_groups_of_consecutive_rows() {
        let sheet = Sheet::from_csv(b"number,line\n1,a\n1,b\n2,c\n1,d\n").unwrap();
        let groups = sheet.groups(&["number"]);
        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
        assert_eq!(groups[2][0].number, 5);
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        assert!(matches!(
            Sheet::from_csv(b"a,b\n1,2,3\n"),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn test_row_error_messages() {
        assert_eq!(
            RowError::field(3, "email", "Enter a valid email address.").to_string(),
            "Row 3, email: Enter a valid email address."
        );
        assert_eq!(
            RowError::missing_reference(4, "recipient").to_string(),
            "The input in row 4 and column recipient doesn't exist in the records."
        );
    }

    #[test]
    fn test_parse_cells() {
        assert_eq!(
            parse_date("issue_date", "05/03/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_date("issue_date", "2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(parse_date("issue_date", "03-05-2024").is_err());
        assert_eq!(parse_amount("vat_amount", "210.5").unwrap().cents(), 21_050);
        assert!(parse_amount("vat_amount", "").is_err());
        assert_eq!(
            parse_amount("taxable_amount", "9999999999999.99").unwrap().cents(),
            999_999_999_999_999
        );
        assert!(matches!(
            parse_amount("taxable_amount", "92233720368547758.07"),
            Err(ValidationError::OutOfRange { field }) if field == "taxable_amount"
        ));
    }
}
