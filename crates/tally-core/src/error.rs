//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError         - Business rule violations                      │
//! │  ├── ValidationError   - One field failed a rule                       │
//! │  └── ValidationErrors  - Every field failure of one input              │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError          - What HTTP clients see (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → JSON         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Attribution
//! Bulk imports report `Row N, field: message`. Every error knows which field
//! it belongs to; rules spanning several fields report `general`.

use std::fmt;

use thiserror::Error;

use crate::money::Money;
use crate::numbering::DocumentKind;

/// Field name used for rules that are not tied to a single field.
pub const GENERAL_FIELD: &str = "general";

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// The messages are shown to users verbatim, both in API responses and in
/// bulk import reports.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The singleton company row has not been created yet.
    #[error("The company settings have not been configured yet.")]
    CompanyNotConfigured,

    /// A second company was submitted for creation.
    #[error("An instance of Company already exists")]
    CompanyAlreadyExists,

    /// No financial year is flagged as current.
    #[error("First you have to set the current financial year.")]
    NoCurrentFinancialYear,

    /// Issue date outside the current financial year.
    #[error("The selected date is not within the current year.")]
    OutsideCurrentYear,

    /// Financial year older than the company itself.
    #[error("The year {year} is older than the company's creation year ({creation_year}).")]
    YearBeforeCreation { year: i32, creation_year: i32 },

    /// Issue date earlier than document `n-1` of the same series.
    ///
    /// ## User Workflow
    /// ```text
    /// Invoice 00000007 issued 2024-03-10
    ///      │
    ///      ▼
    /// New invoice 00000008 dated 2024-03-09
    ///      │
    ///      ▼
    /// IssueDateBeforePrevious { document: Invoice }
    ///      │
    ///      ▼
    /// "Issue date can't be older than previous invoice."
    /// ```
    #[error("Issue date can't be older than previous {document}.")]
    IssueDateBeforePrevious { document: DocumentKind },

    /// Issue date later than document `n+1` of the same series.
    #[error("Issue date can't be later than next {document}.")]
    IssueDateAfterNext { document: DocumentKind },

    /// Documents cannot be issued on a disabled point of sale.
    #[error("Point of sell {pos_number} is disabled.")]
    PointOfSaleDisabled { pos_number: String },

    /// A single receipt larger than its invoice.
    #[error("Receipt total amount cannot be higher than invoice total amount.")]
    ReceiptExceedsInvoice,

    /// The receipts of an invoice would add up to more than its total.
    #[error("The sum of your receipts cannot be higher than invoice total amount.")]
    ReceiptsExceedInvoice,

    /// An edited invoice would be smaller than what was already collected.
    #[error("Invoice total amount cannot be lower than its receipts ({receipts}).")]
    InvoiceBelowReceipts { receipts: Money },

    /// Receipt addressed to someone other than the invoice's client.
    #[error("The receipt recipient must be the client of the related invoice.")]
    RecipientMismatch,

    /// Clients and suppliers may not reuse the company's tax number.
    #[error("Tax number {0} belongs to the company.")]
    TaxNumberBelongsToCompany(String),

    /// Invoice submitted without lines.
    #[error("An invoice must have at least one line.")]
    EmptyInvoice,

    /// Journal entry with fewer than two lines.
    #[error("An entry must have at least two lines.")]
    EntryTooShort,

    /// Journal line that is neither a debit nor a credit, or both.
    #[error("Line {position} must have either a debit or a credit amount.")]
    OneSidedLine { position: usize },

    /// Journal entry whose totals do not match.
    #[error("Debit must be equal to credit")]
    UnbalancedEntry { debit: Money, credit: Money },

    /// Posting on an account flagged as not allocable.
    #[error("Account {0} doesn't accept entries.")]
    AccountNotAllocable(String),

    /// Field validation failures.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

impl CoreError {
    /// Returns the field this error is reported on.
    pub fn field(&self) -> &str {
        match self {
            CoreError::NoCurrentFinancialYear | CoreError::OutsideCurrentYear => "issue_date",
            CoreError::YearBeforeCreation { .. } => "year",
            CoreError::PointOfSaleDisabled { .. } => "point_of_sell",
            CoreError::RecipientMismatch => "recipient",
            CoreError::TaxNumberBelongsToCompany(_) => "tax_number",
            CoreError::Validation(errors) => errors
                .iter()
                .next()
                .map(ValidationError::field)
                .unwrap_or(GENERAL_FIELD),
            _ => GENERAL_FIELD,
        }
    }

    /// Splits the error into `(field, message)` pairs.
    pub fn messages(&self) -> Vec<(String, String)> {
        match self {
            CoreError::Validation(errors) => errors
                .iter()
                .map(|e| (e.field().to_string(), e.to_string()))
                .collect(),
            other => vec![(other.field().to_string(), other.to_string())],
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(ValidationErrors::from(err))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements and are
/// checked before any business rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value contains something other than digits.
    #[error("{value} must be only digits.")]
    NotDigits { field: String, value: String },

    /// Field value contains something other than letters.
    #[error("{value} must be only letters.")]
    NotLetters { field: String, value: String },

    /// Malformed e-mail address.
    #[error("Enter a valid email address.")]
    InvalidEmail { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Amount with more than 13 integer digits.
    #[error("{field} must have at most 13 digits before the decimal point")]
    OutOfRange { field: String },

    /// Invalid format (e.g., invalid date, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate tax number).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::NotDigits { field, .. }
            | ValidationError::NotLetters { field, .. }
            | ValidationError::InvalidEmail { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::OutOfRange { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// All field failures of one input, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records the error of a check, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.0.push(err);
        }
    }

    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
