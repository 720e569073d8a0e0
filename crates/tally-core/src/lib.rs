//! # tally-core: Pure Business Logic for Tally
//!
//! This crate holds every business rule of the ledger as pure functions with
//! zero I/O dependencies. The database layer calls into it inside its
//! transactions; the HTTP layer never reimplements a rule.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /api/sale_invoices, /api/sale_receipts, /api/import, ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (repositories)                      │   │
//! │  │        one transaction per write, rules from tally-core         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ numbering │  │ collection│  │   │
//! │  │   │  Invoice  │  │   Money   │  │  zfill    │  │ collected │  │   │
//! │  │   │  Receipt  │  │  parsing  │  │  n-1, n+1 │  │  amounts  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ calendar  │  │bookkeeping│  │  import   │  │ validation│  │   │
//! │  │   │ fin. year │  │ balanced  │  │ CSV sheet │  │  fields   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities, inputs, listing rows and filters
//! - [`money`] - Integer-cents `Money` with decimal parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules and input cleaning
//! - [`numbering`] - Document numbers and date correlation
//! - [`calendar`] - Financial year rules and period bounds
//! - [`collection`] - Receipt amounts and the collected flag
//! - [`bookkeeping`] - Journal entry balance
//! - [`import`] - Reading uploaded CSV sheets and row errors
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::collection::is_collected;
//! use tally_core::money::Money;
//!
//! let total = Money::from_cents(130_001);
//! let receipts: Money = [Money::from_cents(100_000), Money::from_cents(30_001)]
//!     .into_iter()
//!     .sum();
//!
//! assert!(is_collected(total, receipts));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bookkeeping;
pub mod calendar;
pub mod collection;
pub mod error;
pub mod import;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Width of invoice and receipt numbers (`00000042`).
pub const DOCUMENT_NUMBER_WIDTH: usize = 8;

/// Width of point of sale numbers (`00001`).
pub const POS_NUMBER_WIDTH: usize = 5;

/// Width of document type codes (`001`).
pub const DOCUMENT_CODE_WIDTH: usize = 3;

/// Width of chart of accounts category codes (`01`).
pub const CATEGORY_CODE_WIDTH: usize = 2;

/// Maximum digits of a chart of accounts code.
pub const ACCOUNT_CODE_MAX: usize = 6;

/// Amounts keep at most 15 digits, two of them decimals. Anything with an
/// absolute value of this many cents or more is rejected.
pub const AMOUNT_LIMIT_CENTS: i64 = 1_000_000_000_000_000;
