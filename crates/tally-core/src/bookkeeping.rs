//! # Bookkeeping
//!
//! Double-entry rules for journal entries. An entry is checked as a whole
//! before anything is written, so a rejected entry leaves no lines behind.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::JournalLineInput;

/// Checks the shape and balance of a journal entry.
///
/// ## Rules
/// - at least two lines
/// - each line has exactly one positive side
/// - total debit equals total credit
///
/// ## Returns
/// The entry total (either side) when balanced.
pub fn check_balanced(lines: &[JournalLineInput]) -> CoreResult<Money> {
    if lines.len() < 2 {
        return Err(CoreError::EntryTooShort);
    }

    let mut debit = Money::zero();
    let mut credit = Money::zero();

    for (index, line) in lines.iter().enumerate() {
        let one_sided = match (line.debit_cents, line.credit_cents) {
            (d, 0) if d > 0 => true,
            (0, c) if c > 0 => true,
            _ => false,
        };
        if !one_sided {
            return Err(CoreError::OneSidedLine {
                position: index + 1,
            });
        }
        debit = add_side(debit, line.debit_cents, "debit")?;
        credit = add_side(credit, line.credit_cents, "credit")?;
    }

    if debit != credit {
        return Err(CoreError::UnbalancedEntry { debit, credit });
    }
    Ok(debit)
}

fn add_side(sum: Money, cents: i64, field: &str) -> CoreResult<Money> {
    sum.checked_add(Money::from_cents(cents)).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: field.to_string(),
        }
        .into()
    })
}

/// Display label of an account: category code followed by the account code.
pub fn account_label(category_code: &str, code: &str, name: &str) -> String {
    format!("{}{} {}", category_code, code, name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(debit: i64, credit: i64) -> JournalLineInput {
        JournalLineInput {
            account_id: "a".to_string(),
            debit_cents: debit,
            credit_cents: credit,
        }
    }

    #[test]
    fn test_balanced_entry() {
        let total = check_balanced(&[line(1000, 0), line(0, 600), line(0, 400)]).unwrap();
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_unbalanced_entry() {
        let err = check_balanced(&[line(1000, 0), line(0, 999)]).unwrap_err();
        assert_eq!(err.to_string(), "Debit must be equal to credit");
    }

    #[test]
    fn test_line_shape() {
        assert!(matches!(
            check_balanced(&[line(1000, 1000), line(0, 0)]),
            Err(CoreError::OneSidedLine { position: 1 })
        ));
        assert!(matches!(
            check_balanced(&[line(1000, 0), line(0, -1000)]),
            Err(CoreError::OneSidedLine { position: 2 })
        ));
        assert!(matches!(
            check_balanced(&[line(1000, 0)]),
            Err(CoreError::EntryTooShort)
        ));
    }

    #[test]
    fn test_overflowing_side_is_an_error() {
        let err = check_balanced(&[line(i64::MAX, 0), line(1, 0), line(0, 1)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.field(), "debit");
    }

    #[test]
    fn test_account_label() {
        assert_eq!(account_label("01", "101", "Cash"), "01101 Cash");
    }
}
