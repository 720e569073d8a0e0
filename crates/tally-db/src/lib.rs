//! # tally-db: Database Layer for Tally
//!
//! This crate provides database access for the Tally ledger.
//! It uses SQLite for storage with sqlx for async operations, and enforces
//! the cross-record rules of `tally-core` inside write transactions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /api/sale_receipts)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (sale_*.rs ..) │   │  (embedded)  │  │   │
//! │  │   │               │    │                │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleInvoiceRepo│   │ 001_initial_ │  │   │
//! │  │   │ Transactions  │    │ SaleReceiptRepo│   │   schema.sql │  │   │
//! │  │   │               │◄───│ Importer       │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./data/tally.db                                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (sale invoices, receipts, ...)
//! - [`import`] - Atomic CSV uploads
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! // Create database with default config (migrations run on connect)
//! let db = Database::new(DbConfig::new("./data/tally.db")).await?;
//!
//! // Use repositories
//! let next = db.sale_receipts().next_number(&pos_id).await?;
//! let dashboard = db.dashboard().summary().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use import::Importer;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bookkeeping::BookkeepingRepository;
pub use repository::company::CompanyRepository;
pub use repository::person::PersonRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale_invoice::SaleInvoiceRepository;
pub use repository::sale_receipt::SaleReceiptRepository;
