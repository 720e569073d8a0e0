//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Company (singleton) ── FinancialYear (one current)                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SaleInvoice    │◄──│  SaleReceipt    │   │  AccountEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  doc type       │   │  pos + number   │   │  +invoice total │       │
//! │  │  pos + number   │   │  total_cents    │   │  -receipt total │       │
//! │  │  lines[]        │   │  related inv.   │   │                 │       │
//! │  │  collected      │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  PurchaseInvoice ◄── PurchaseReceipt       (supplier side mirror)      │
//! │                                                                         │
//! │  ChartCategory ── ChartAccount ── JournalEntry ── JournalLine          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `id`: UUID v4 text, used for relations
//! - business keys (`number`, `pos_number`, `code`, `tax_number`) are
//!   zero-filled digit strings
//! - every amount is an `i64` of cents; helpers return [`Money`]
//! - `*Input` types are what callers submit, the rest is what is stored

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Company
// =============================================================================

/// The company keeping the books. There is at most one.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub tax_number: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub creation_date: NaiveDate,
    /// Day and month the financial year ends on.
    pub closing_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyInput {
    pub tax_number: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub creation_date: NaiveDate,
    pub closing_date: NaiveDate,
}

// =============================================================================
// Financial Years
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FinancialYear {
    pub id: String,
    /// Four digits, e.g. `"2024"`.
    pub year: String,
    pub current: bool,
}

impl FinancialYear {
    /// The year as a number. Stored values are always four digits.
    pub fn year_number(&self) -> i32 {
        self.year.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialYearInput {
    pub year: String,
    #[serde(default)]
    pub current: bool,
}

/// Which bounds a year is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum YearKind {
    /// Ends on the company's closing date.
    #[default]
    Financial,
    /// January 1st to December 31st.
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Bounds of a year and of the year before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct YearPeriods {
    pub year: i32,
    pub kind: YearKind,
    pub current: Period,
    pub previous: Period,
}

// =============================================================================
// Clients & Suppliers
// =============================================================================

/// Clients and suppliers share their shape but live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    Client,
    Supplier,
}

impl PersonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Client => "client",
            PersonKind::Supplier => "supplier",
        }
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PersonKind::Client => "Client",
            PersonKind::Supplier => "Supplier",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Person {
    pub id: String,
    pub tax_number: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PersonInput {
    pub tax_number: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// One movement on a client or supplier current account.
///
/// Invoices add their total, receipts subtract theirs. The opening entry
/// written when the person is created has neither link.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AccountEntry {
    pub id: String,
    pub person_id: String,
    pub date: NaiveDate,
    pub amount_cents: i64,
    pub invoice_id: Option<String>,
    pub receipt_id: Option<String>,
}

impl AccountEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountStatement {
    pub person: Person,
    pub entries: Vec<AccountEntry>,
    pub balance_cents: i64,
}

// =============================================================================
// Payment Conditions
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethodInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentTerm {
    pub id: String,
    pub days: i64,
}

impl fmt::Display for PaymentTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days)
    }
}

/// Days are submitted as text so `"030"` and `"30"` go through the same
/// digit rules.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentTermInput {
    pub days: String,
}

// =============================================================================
// Points of Sale & Document Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PointOfSale {
    pub id: String,
    /// Five digits, zero-filled.
    pub pos_number: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PointOfSaleInput {
    pub pos_number: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DocumentType {
    pub id: String,
    /// Three digits, zero-filled.
    pub code: String,
    /// Upper-case letters, e.g. `FA`.
    #[serde(rename = "type")]
    pub doc_type: String,
    pub description: String,
    pub hide: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTypeInput {
    pub code: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "hidden_by_default")]
    pub hide: bool,
}

fn hidden_by_default() -> bool {
    true
}

// =============================================================================
// Invoice Lines
// =============================================================================

/// A stored invoice line. `total_cents` is always the sum of the three
/// amounts and is recomputed on every write.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceLine {
    pub id: String,
    pub invoice_id: String,
    pub position: i64,
    pub description: String,
    pub taxable_cents: i64,
    pub not_taxable_cents: i64,
    pub vat_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceLineInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub taxable_cents: i64,
    #[serde(default)]
    pub not_taxable_cents: i64,
    #[serde(default)]
    pub vat_cents: i64,
}

impl InvoiceLineInput {
    /// Line total: taxable + not taxable + VAT.
    ///
    /// Fails on `total_amount` when the sum does not fit.
    pub fn total(&self) -> CoreResult<Money> {
        Money::from_cents(self.taxable_cents)
            .checked_add(Money::from_cents(self.not_taxable_cents))
            .and_then(|sum| sum.checked_add(Money::from_cents(self.vat_cents)))
            .ok_or_else(|| total_out_of_range().into())
    }
}

/// Sum of every line total.
pub fn lines_total(lines: &[InvoiceLineInput]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::zero(), |sum, line| -> CoreResult<Money> {
        sum.checked_add(line.total()?)
            .ok_or_else(|| total_out_of_range().into())
    })
}

fn total_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "total_amount".to_string(),
    }
}

// =============================================================================
// Sales
// =============================================================================

/// A sale invoice issued by the company to a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleInvoice {
    pub id: String,
    pub issue_date: NaiveDate,
    pub doc_type_id: String,
    pub point_of_sale_id: String,
    /// Eight digits, zero-filled.
    pub number: String,
    /// The company.
    pub sender_id: String,
    /// The client.
    pub recipient_id: String,
    pub payment_method_id: String,
    pub payment_term_id: String,
    /// True once the receipts add up to the invoice total.
    pub collected: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<InvoiceLine>,
}

impl SaleInvoice {
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| Money::from_cents(l.total_cents)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleInvoiceInput {
    pub issue_date: NaiveDate,
    pub doc_type_id: String,
    pub point_of_sale_id: String,
    pub number: String,
    pub recipient_id: String,
    pub payment_method_id: String,
    pub payment_term_id: String,
    pub lines: Vec<InvoiceLineInput>,
}

/// A payment received against a sale invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleReceipt {
    pub id: String,
    pub issue_date: NaiveDate,
    pub point_of_sale_id: String,
    pub number: String,
    pub related_invoice_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub description: String,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleReceipt {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceiptInput {
    pub issue_date: NaiveDate,
    pub point_of_sale_id: String,
    pub number: String,
    pub related_invoice_id: String,
    /// Defaults to the client of the related invoice.
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub total_cents: i64,
}

// =============================================================================
// Purchases
// =============================================================================

/// An invoice received from a supplier. The point of sale is the
/// supplier's own, so it is stored as text rather than a reference.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseInvoice {
    pub id: String,
    pub issue_date: NaiveDate,
    pub doc_type_id: String,
    pub point_of_sale: String,
    pub number: String,
    /// The supplier.
    pub sender_id: String,
    pub payment_method_id: String,
    pub payment_term_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<InvoiceLine>,
}

impl PurchaseInvoice {
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| Money::from_cents(l.total_cents)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseInvoiceInput {
    pub issue_date: NaiveDate,
    pub doc_type_id: String,
    pub point_of_sale: String,
    pub number: String,
    pub sender_id: String,
    pub payment_method_id: String,
    pub payment_term_id: String,
    pub lines: Vec<InvoiceLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseReceipt {
    pub id: String,
    pub issue_date: NaiveDate,
    pub point_of_sale: String,
    pub number: String,
    pub related_invoice_id: String,
    pub sender_id: String,
    pub description: String,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseReceiptInput {
    pub issue_date: NaiveDate,
    pub point_of_sale: String,
    pub number: String,
    pub related_invoice_id: String,
    #[serde(default)]
    pub description: String,
    pub total_cents: i64,
}

// =============================================================================
// Listing Rows
// =============================================================================

/// A sale invoice as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleInvoiceRow {
    pub id: String,
    pub issue_date: NaiveDate,
    /// `"{TYPE} {pos}-{number}"`, e.g. `FA 00001-00000042`.
    pub label: String,
    pub doc_type_id: String,
    pub point_of_sale_id: String,
    pub number: String,
    pub recipient_id: String,
    pub client_name: String,
    pub client_tax_number: String,
    pub total_cents: i64,
    /// Sum of the receipts applied so far.
    pub collected_cents: i64,
    pub collected: bool,
}

/// A sale receipt as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleReceiptRow {
    pub id: String,
    pub issue_date: NaiveDate,
    /// `"{pos}-{number}"`.
    pub label: String,
    pub point_of_sale_id: String,
    pub number: String,
    pub related_invoice_id: String,
    pub invoice_label: String,
    pub recipient_id: String,
    pub client_name: String,
    pub client_tax_number: String,
    pub total_cents: i64,
}

/// A purchase invoice as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseInvoiceRow {
    pub id: String,
    pub issue_date: NaiveDate,
    pub label: String,
    pub sender_id: String,
    pub supplier_name: String,
    pub total_cents: i64,
    pub paid_cents: i64,
}

// =============================================================================
// Search Filters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CollectedFilter {
    #[default]
    All,
    Uncollected,
    Collected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct SaleInvoiceFilter {
    pub collected: CollectedFilter,
    pub doc_type_id: Option<String>,
    pub point_of_sale_id: Option<String>,
    /// Partial number, matched anywhere.
    pub number: Option<String>,
    pub client_tax_number: Option<String>,
    /// Partial, case-insensitive.
    pub client_name: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Leaves one invoice out, used when picking a replacement.
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct SaleReceiptFilter {
    /// Partial label of the related invoice.
    pub related_invoice: Option<String>,
    pub point_of_sale_id: Option<String>,
    pub number: Option<String>,
    pub client_tax_number: Option<String>,
    pub client_name: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

// =============================================================================
// Bookkeeping
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ChartCategory {
    pub id: String,
    /// Two digits, zero-filled.
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartCategoryInput {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ChartAccount {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category_id: String,
    pub allocable: bool,
    /// `"{category code}{code} {name}"`.
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartAccountInput {
    pub code: String,
    pub name: String,
    pub category_id: String,
    #[serde(default = "allocable_by_default")]
    pub allocable: bool,
}

fn allocable_by_default() -> bool {
    true
}

/// A posted journal entry. Entries are written whole and never edited.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct JournalEntry {
    pub id: String,
    pub number: i64,
    pub date: NaiveDate,
    pub description: String,
    pub locked: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<JournalLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct JournalLine {
    pub id: String,
    pub entry_id: String,
    pub position: i64,
    pub account_id: String,
    pub debit_cents: i64,
    pub credit_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JournalEntryInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub lines: Vec<JournalLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JournalLineInput {
    pub account_id: String,
    #[serde(default)]
    pub debit_cents: i64,
    #[serde(default)]
    pub credit_cents: i64,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Figures shown on the landing screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    /// Balance of every client current account.
    pub amount_to_collect_cents: i64,
    pub last_invoice: Option<SaleInvoiceRow>,
    pub last_receipt: Option<SaleReceiptRow>,
    pub oldest_pending_invoice: Option<SaleInvoiceRow>,
    pub highest_receipt: Option<SaleReceiptRow>,
    pub current_year: Option<FinancialYear>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(taxable: i64, not_taxable: i64, vat: i64) -> InvoiceLineInput {
        InvoiceLineInput {
            description: String::new(),
            taxable_cents: taxable,
            not_taxable_cents: not_taxable,
            vat_cents: vat,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(100_000, 0, 21_000).total().unwrap().cents(), 121_000);
        assert_eq!(
            lines_total(&[line(1000, 1, 0), line(0, 0, 210)]).unwrap().cents(),
            1211
        );
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let err = line(i64::MAX, 0, 1).total().unwrap_err();
        assert_eq!(err.field(), "total_amount");

        let half = i64::MAX / 2 + 1;
        assert!(lines_total(&[line(half, 0, 0), line(half, 0, 0)]).is_err());
    }

    #[test]
    fn test_payment_term_display() {
        let term = PaymentTerm {
            id: "t".to_string(),
            days: 30,
        };
        assert_eq!(term.to_string(), "30 days");
    }

    #[test]
    fn test_document_type_defaults() {
        let input: DocumentTypeInput =
            serde_json::from_str(r#"{"code":"1","type":"fa"}"#).unwrap();
        assert!(input.hide);
        assert_eq!(input.doc_type, "fa");
    }

    #[test]
    fn test_filter_defaults() {
        let filter: SaleInvoiceFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.collected, CollectedFilter::All);

        let filter: SaleInvoiceFilter =
            serde_json::from_str(r#"{"collected":"uncollected","year":2024}"#).unwrap();
        assert_eq!(filter.collected, CollectedFilter::Uncollected);
        assert_eq!(filter.year, Some(2024));
    }

    #[test]
    fn test_period_contains() {
        let period = Period {
            start: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        };
        assert!(period.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }
}
