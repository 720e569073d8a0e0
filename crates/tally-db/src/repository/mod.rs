//! # Repository Module
//!
//! Database repository implementations for Tally.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.sale_receipts().create(input)                              │
//! │       ▼                                                                 │
//! │  SaleReceiptRepository (public, owns a pool handle)                    │
//! │       │  pool.begin()                                                   │
//! │       ▼                                                                 │
//! │  sale_receipt::insert(&mut tx, ..)    ◄── also called by the importer  │
//! │       │  rules from tally-core, SQL on the same connection             │
//! │       ▼                                                                 │
//! │  commit / rollback                                                     │
//! │                                                                         │
//! │  Write helpers take `&mut SqliteConnection`, never the pool, so one    │
//! │  upload can run hundreds of them inside a single transaction.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`company::CompanyRepository`] - Company settings and period bounds
//! - [`financial_year::FinancialYearRepository`] - Financial years
//! - [`person::PersonRepository`] - Clients and suppliers
//! - [`current_account::CurrentAccountRepository`] - Current account statements
//! - [`payment::PaymentRepository`] - Payment methods and terms
//! - [`point_of_sale::PointOfSaleRepository`] - Points of sale
//! - [`document_type::DocumentTypeRepository`] - Document types
//! - [`sale_invoice::SaleInvoiceRepository`] - Sale invoices
//! - [`sale_receipt::SaleReceiptRepository`] - Sale receipts
//! - [`purchase::PurchaseRepository`] - Purchase invoices and receipts
//! - [`bookkeeping::BookkeepingRepository`] - Chart of accounts and journal
//! - [`dashboard::DashboardRepository`] - Landing screen figures

pub mod bookkeeping;
pub mod company;
pub mod current_account;
pub mod dashboard;
pub mod document_type;
pub mod financial_year;
pub(crate) mod lines;
pub mod payment;
pub mod person;
pub mod point_of_sale;
pub mod purchase;
pub mod sale_invoice;
pub mod sale_receipt;

use sqlx::SqliteConnection;

use crate::error::{DbError, DbResult};

/// Fails with NotFound unless `table` has a row with this id.
pub(crate) async fn require_exists(
    conn: &mut SqliteConnection,
    table: &str,
    entity: &str,
    id: &str,
) -> DbResult<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DbError::not_found(entity, id)),
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================
