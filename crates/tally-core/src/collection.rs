//! # Collection Status
//!
//! Rules linking receipts to the invoice they settle.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Invoice total 1300.01                                                  │
//! │                                                                         │
//! │  receipt #1  1000.00   receipts 1000.00   collected = false            │
//! │  receipt #2   300.01   receipts 1300.01   collected = true             │
//! │  receipt #2 deleted    receipts 1000.00   collected = false            │
//! │  receipt #3   400.00   rejected: receipts would exceed the total       │
//! │                                                                         │
//! │  The flag is recomputed after every receipt write, for the old and     │
//! │  the new invoice when a receipt moves between invoices.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Checks a receipt amount against its invoice.
///
/// ## Arguments
/// * `amount` - the receipt being written
/// * `invoice_total` - sum of the invoice lines
/// * `other_receipts` - every other receipt of the invoice (the receipt
///   being edited is excluded)
pub fn check_receipt_amount(
    amount: Money,
    invoice_total: Money,
    other_receipts: Money,
) -> CoreResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "total_amount".to_string(),
        }
        .into());
    }
    if amount > invoice_total {
        return Err(CoreError::ReceiptExceedsInvoice);
    }
    match other_receipts.checked_add(amount) {
        Some(collected) if collected <= invoice_total => Ok(()),
        _ => Err(CoreError::ReceiptsExceedInvoice),
    }
}

/// An invoice is collected when nothing is left to collect.
#[inline]
pub fn is_collected(invoice_total: Money, receipts_total: Money) -> bool {
    (invoice_total - receipts_total).is_zero()
}

/// Amount still to be collected.
#[inline]
pub fn outstanding(invoice_total: Money, receipts_total: Money) -> Money {
    invoice_total - receipts_total
}

/// An edited invoice may not end below what was already collected on it.
pub fn check_invoice_covers_receipts(new_total: Money, receipts_total: Money) -> CoreResult<()> {
    if new_total < receipts_total {
        return Err(CoreError::InvoiceBelowReceipts {
            receipts: receipts_total,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn test_receipt_within_total() {
        assert!(check_receipt_amount(m(100_000), m(130_001), m(0)).is_ok());
        assert!(check_receipt_amount(m(30_001), m(130_001), m(100_000)).is_ok());
    }

    #[test]
    fn test_receipt_larger_than_invoice() {
        assert!(matches!(
            check_receipt_amount(m(130_002), m(130_001), m(0)),
            Err(CoreError::ReceiptExceedsInvoice)
        ));
    }

    #[test]
    fn test_receipts_sum_larger_than_invoice() {
        assert!(matches!(
            check_receipt_amount(m(40_000), m(130_001), m(100_000)),
            Err(CoreError::ReceiptsExceedInvoice)
        ));
        assert!(matches!(
            check_receipt_amount(m(2), m(i64::MAX), m(i64::MAX - 1)),
            Err(CoreError::ReceiptsExceedInvoice)
        ));
    }

    #[test]
    fn test_receipt_must_be_positive() {
        let err = check_receipt_amount(m(0), m(100), m(0)).unwrap_err();
        assert_eq!(err.field(), "total_amount");
    }

    #[test]
    fn test_is_collected() {
        assert!(is_collected(m(130_001), m(130_001)));
        assert!(!is_collected(m(130_001), m(100_000)));
        assert!(!is_collected(m(130_001), m(0)));
        assert_eq!(outstanding(m(130_001), m(100_000)).cents(), 30_001);
    }

    #[test]
    fn test_invoice_covers_receipts() {
        assert!(check_invoice_covers_receipts(m(500), m(500)).is_ok());
        assert!(matches!(
            check_invoice_covers_receipts(m(499), m(500)),
            Err(CoreError::InvoiceBelowReceipts { .. })
        ));
    }
}
