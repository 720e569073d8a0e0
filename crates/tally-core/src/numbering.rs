//! # Document Numbering
//!
//! Numbers of invoices and receipts are zero-filled digit strings that grow
//! by one inside a series. A series is `(document type, point of sale)` for
//! invoices and the point of sale alone for receipts.
//!
//! ## Date Correlation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Series FA 00001                                                        │
//! │                                                                         │
//! │   n-1: 00000007  2024-03-10  ─┐                                        │
//! │                               │  new date must be >= 2024-03-10        │
//! │   n:   00000008  ??????????  ◄┤                                        │
//! │                               │  new date must be <= 2024-03-15        │
//! │   n+1: 00000009  2024-03-15  ─┘                                        │
//! │                                                                         │
//! │  A missing n-1 is fine: a series may start at any number.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::DOCUMENT_NUMBER_WIDTH;

/// The kind of commercial document a series holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Receipt,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Receipt => "receipt",
        })
    }
}

/// Left-pads `value` with zeros up to `width`. Longer values are kept.
///
/// ## Example
/// ```rust
/// use tally_core::numbering::zero_fill;
///
/// assert_eq!(zero_fill("42", 8), "00000042");
/// assert_eq!(zero_fill("123456", 5), "123456");
/// ```
pub fn zero_fill(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// Reads a stored number. `None` for anything but digits.
pub fn parse_number(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Number `n-1` of the series, when `n > 1`.
pub fn previous_number(number: &str) -> Option<String> {
    match parse_number(number)? {
        0 | 1 => None,
        n => Some(zero_fill(&(n - 1).to_string(), DOCUMENT_NUMBER_WIDTH)),
    }
}

/// Number `n+1` of the series.
pub fn following_number(number: &str) -> Option<String> {
    let n = parse_number(number)?;
    Some(zero_fill(
        &n.checked_add(1)?.to_string(),
        DOCUMENT_NUMBER_WIDTH,
    ))
}

/// The number a new document of the series should take, given the last one.
///
/// ## Example
/// ```rust
/// use tally_core::numbering::next_in_series;
///
/// assert_eq!(next_in_series(None), "00000001");
/// assert_eq!(next_in_series(Some("00000041")), "00000042");
/// ```
pub fn next_in_series(last: Option<&str>) -> String {
    last.and_then(following_number)
        .unwrap_or_else(|| zero_fill("1", DOCUMENT_NUMBER_WIDTH))
}

/// Checks an issue date against its neighbours in the series.
///
/// ## Arguments
/// * `previous` - issue date of document `n-1`, if it exists
/// * `next` - issue date of document `n+1`, if it exists
pub fn check_date_correlation(
    document: DocumentKind,
    issue_date: NaiveDate,
    previous: Option<NaiveDate>,
    next: Option<NaiveDate>,
) -> CoreResult<()> {
    if let Some(previous) = previous {
        if issue_date < previous {
            return Err(CoreError::IssueDateBeforePrevious { document });
        }
    }
    if let Some(next) = next {
        if issue_date > next {
            return Err(CoreError::IssueDateAfterNext { document });
        }
    }
    Ok(())
}

/// Display label of an invoice: `"{TYPE} {pos}-{number}"`.
pub fn invoice_label(doc_type: &str, pos_number: &str, number: &str) -> String {
    format!("{} {}-{}", doc_type, pos_number, number)
}

/// Display label of a receipt: `"{pos}-{number}"`.
pub fn receipt_label(pos_number: &str, number: &str) -> String {
    format!("{}-{}", pos_number, number)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_number() {
        assert_eq!(previous_number("00000008").as_deref(), Some("00000007"));
        assert_eq!(previous_number("00000001"), None);
        assert_eq!(previous_number("10"), Some("00000009".to_string()));
        assert_eq!(previous_number("abc"), None);
    }

    #[test]
    fn test_following_number() {
        assert_eq!(following_number("00000009").as_deref(), Some("00000010"));
        assert_eq!(following_number("99999999").as_deref(), Some("100000000"));
    }

    #[test]
    fn test_date_correlation_previous() {
        let result = check_date_correlation(
            DocumentKind::Invoice,
            date(2024, 3, 9),
            Some(date(2024, 3, 10)),
            None,
        );
        assert!(matches!(
            result,
            Err(CoreError::IssueDateBeforePrevious {
                document: DocumentKind::Invoice
            })
        ));

        // Same day is accepted
        assert!(check_date_correlation(
            DocumentKind::Invoice,
            date(2024, 3, 10),
            Some(date(2024, 3, 10)),
            None,
        )
        .is_ok());
    }

    #[test]
    fn test_date_correlation_next() {
        let result = check_date_correlation(
            DocumentKind::Receipt,
            date(2024, 3, 16),
            Some(date(2024, 3, 10)),
            Some(date(2024, 3, 15)),
        );
        assert!(matches!(result, Err(CoreError::IssueDateAfterNext { .. })));
    }

    #[test]
    fn test_series_may_start_anywhere() {
        assert!(check_date_correlation(DocumentKind::Receipt, date(2024, 1, 1), None, None).is_ok());
    }

    #[test]
    fn test_labels() {
        assert_eq!(invoice_label("FA", "00001", "00000042"), "FA 00001-00000042");
        assert_eq!(receipt_label("00001", "00000003"), "00001-00000003");
    }
}
