//! # Validation Module
//!
//! Field rules and input cleaning for Tally.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Types, dates, required JSON keys                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: field rules + normalisation                     │
//! │  ├── digits only, letters only, lengths, e-mail                        │
//! │  └── zero-fill numbers, upper-case codes                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Business rules (numbering, calendar, collection)             │
//! │  └── Need stored data, run inside the write transaction                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints (RESTRICT on referenced rows)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `clean_*` function checks all fields before returning, so a caller
//! gets every failure of an input at once, and returns the normalised input
//! on success.

use crate::error::{ValidationError, ValidationErrors};
use crate::numbering::zero_fill;
use crate::types::{
    lines_total, ChartAccountInput, ChartCategoryInput, CompanyInput, DocumentTypeInput,
    FinancialYearInput, InvoiceLineInput, JournalEntryInput, PaymentMethodInput, PaymentTermInput,
    PersonInput, PointOfSaleInput, PurchaseInvoiceInput, PurchaseReceiptInput, SaleInvoiceInput,
    SaleReceiptInput,
};
use crate::{
    ACCOUNT_CODE_MAX, AMOUNT_LIMIT_CENTS, CATEGORY_CODE_WIDTH, DOCUMENT_CODE_WIDTH,
    DOCUMENT_NUMBER_WIDTH, POS_NUMBER_WIDTH,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Length limits shared by the person-like inputs.
pub const TAX_NUMBER_MAX: usize = 11;
pub const NAME_MAX: usize = 50;
pub const ADDRESS_MAX: usize = 80;
pub const PHONE_MAX: usize = 25;
pub const DESCRIPTION_MAX: usize = 280;
pub const ENTRY_DESCRIPTION_MAX: usize = 80;

// =============================================================================
// Field Rules
// =============================================================================

/// Fails when the value is empty after trimming.
pub fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Fails when the value has more than `max` characters.
pub fn max_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Fails unless the value is made of ASCII digits only.
///
/// ## Example
/// ```rust
/// use tally_core::validation::only_digits;
///
/// assert!(only_digits("tax_number", "20301234567").is_ok());
/// assert!(only_digits("tax_number", "20-30123456-7").is_err());
/// ```
pub fn only_digits(field: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotDigits {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Fails unless the value is made of letters only.
pub fn only_letters(field: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() || !value.chars().all(char::is_alphabetic) {
        return Err(ValidationError::NotLetters {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A pragmatic e-mail check: one `@`, a local part, a dotted domain and no
/// whitespace.
pub fn email(field: &str, value: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidEmail {
        field: field.to_string(),
    };

    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Fails unless the amount is strictly positive.
pub fn positive_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Fails when the amount has more than 13 integer digits.
pub fn amount_in_range(field: &str, cents: i64) -> ValidationResult<()> {
    if cents.unsigned_abs() >= AMOUNT_LIMIT_CENTS.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Required digits of at most `max` characters.
fn digits_field(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.is_empty() {
        errors.push(ValidationError::Required {
            field: field.to_string(),
        });
        return;
    }
    errors.check(only_digits(field, value));
    errors.check(max_length(field, value, max));
}

/// Required text of at most `max` characters.
fn text_field(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    errors.check(required(field, value));
    errors.check(max_length(field, value, max));
}

// =============================================================================
// Document Numbers
// =============================================================================

/// Validates and zero-fills a document number (`42` → `00000042`).
pub fn clean_document_number(field: &str, value: &str) -> Result<String, ValidationErrors> {
    let value = value.trim();
    let mut errors = ValidationErrors::new();
    digits_field(&mut errors, field, value, DOCUMENT_NUMBER_WIDTH);
    errors.into_result(zero_fill(value, DOCUMENT_NUMBER_WIDTH))
}

/// Validates and zero-fills a point of sale number (`1` → `00001`).
pub fn clean_pos_number(field: &str, value: &str) -> Result<String, ValidationErrors> {
    let value = value.trim();
    let mut errors = ValidationErrors::new();
    digits_field(&mut errors, field, value, POS_NUMBER_WIDTH);
    errors.into_result(zero_fill(value, POS_NUMBER_WIDTH))
}

// =============================================================================
// Input Cleaning
// =============================================================================

/// Company identity fields.
pub fn clean_company(mut input: CompanyInput) -> Result<CompanyInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    trim_person_fields(
        &mut input.tax_number,
        &mut input.name,
        &mut input.address,
        &mut input.email,
        &mut input.phone,
    );
    check_person_fields(
        &mut errors,
        &input.tax_number,
        &input.name,
        &input.address,
        &input.email,
        &input.phone,
    );
    errors.into_result(input)
}

/// Client or supplier identity fields.
///
/// ## Rules
/// - tax number: digits only, at most 11
/// - name: required, at most 50
/// - address: required, at most 80
/// - email: a valid address
/// - phone: digits only, at most 25
pub fn clean_person(mut input: PersonInput) -> Result<PersonInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    trim_person_fields(
        &mut input.tax_number,
        &mut input.name,
        &mut input.address,
        &mut input.email,
        &mut input.phone,
    );
    check_person_fields(
        &mut errors,
        &input.tax_number,
        &input.name,
        &input.address,
        &input.email,
        &input.phone,
    );
    errors.into_result(input)
}

fn trim_person_fields(
    tax_number: &mut String,
    name: &mut String,
    address: &mut String,
    email: &mut String,
    phone: &mut String,
) {
    for value in [tax_number, name, address, email, phone] {
        *value = value.trim().to_string();
    }
}

fn check_person_fields(
    errors: &mut ValidationErrors,
    tax_number: &str,
    name: &str,
    address: &str,
    email_address: &str,
    phone: &str,
) {
    digits_field(errors, "tax_number", tax_number, TAX_NUMBER_MAX);
    text_field(errors, "name", name, NAME_MAX);
    text_field(errors, "address", address, ADDRESS_MAX);
    if email_address.is_empty() {
        errors.push(ValidationError::Required {
            field: "email".to_string(),
        });
    } else {
        errors.check(email("email", email_address));
    }
    digits_field(errors, "phone", phone, PHONE_MAX);
}

/// A four digit year.
pub fn clean_financial_year(
    mut input: FinancialYearInput,
) -> Result<FinancialYearInput, ValidationErrors> {
    input.year = input.year.trim().to_string();
    let mut errors = ValidationErrors::new();
    digits_field(&mut errors, "year", &input.year, 4);
    if errors.is_empty() && input.year.len() != 4 {
        errors.push(ValidationError::InvalidFormat {
            field: "year".to_string(),
            reason: "must have four digits".to_string(),
        });
    }
    errors.into_result(input)
}

/// Method names are kept as typed; uniqueness is case-insensitive.
pub fn clean_payment_method(
    mut input: PaymentMethodInput,
) -> Result<PaymentMethodInput, ValidationErrors> {
    input.name = input.name.trim().to_string();
    let mut errors = ValidationErrors::new();
    text_field(&mut errors, "name", &input.name, NAME_MAX);
    errors.into_result(input)
}

/// Days: digits only, at most three. Returns the number of days.
pub fn clean_payment_term(input: &PaymentTermInput) -> Result<i64, ValidationErrors> {
    let days = input.days.trim();
    let mut errors = ValidationErrors::new();
    digits_field(&mut errors, "days", days, 3);
    let parsed = days.parse::<i64>().unwrap_or_default();
    errors.into_result(parsed)
}

pub fn clean_point_of_sale(
    mut input: PointOfSaleInput,
) -> Result<PointOfSaleInput, ValidationErrors> {
    input.pos_number = clean_pos_number("pos_number", &input.pos_number)?;
    Ok(input)
}

/// Code zero-filled to three digits, type and description upper-cased.
pub fn clean_document_type(
    mut input: DocumentTypeInput,
) -> Result<DocumentTypeInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let code = input.code.trim().to_string();
    digits_field(&mut errors, "code", &code, DOCUMENT_CODE_WIDTH);
    input.code = zero_fill(&code, DOCUMENT_CODE_WIDTH);

    input.doc_type = input.doc_type.trim().to_uppercase();
    errors.check(only_letters("type", &input.doc_type));
    errors.check(max_length("type", &input.doc_type, 5));

    input.description = input.description.trim().to_uppercase();
    text_field(&mut errors, "description", &input.description, 20);

    errors.into_result(input)
}

/// Invoice lines: at least one line, a description and in-range amounts
/// each, and a total that still fits.
pub fn check_invoice_lines(errors: &mut ValidationErrors, lines: &[InvoiceLineInput]) {
    if lines.is_empty() {
        errors.push(ValidationError::Required {
            field: "lines".to_string(),
        });
    }
    let mut amounts = ValidationErrors::new();
    for line in lines {
        text_field(errors, "description", &line.description, DESCRIPTION_MAX);
        amounts.check(amount_in_range("taxable_amount", line.taxable_cents));
        amounts.check(amount_in_range("not_taxable_amount", line.not_taxable_cents));
        amounts.check(amount_in_range("vat_amount", line.vat_cents));
    }
    if amounts.is_empty() {
        let total = lines_total(lines).map_or(i64::MAX, |total| total.cents());
        amounts.check(amount_in_range("total_amount", total));
    }
    for err in amounts {
        errors.push(err);
    }
}

/// Sale invoice: number zero-filled, every line described.
pub fn clean_sale_invoice(mut input: SaleInvoiceInput) -> Result<SaleInvoiceInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    input.number = collect_number(&mut errors, "number", &input.number, DOCUMENT_NUMBER_WIDTH);
    for line in input.lines.iter_mut() {
        line.description = line.description.trim().to_string();
    }
    check_invoice_lines(&mut errors, &input.lines);
    errors.into_result(input)
}

/// Sale receipt: number zero-filled, description required, positive amount.
pub fn clean_sale_receipt(mut input: SaleReceiptInput) -> Result<SaleReceiptInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    input.number = collect_number(&mut errors, "number", &input.number, DOCUMENT_NUMBER_WIDTH);
    input.description = input.description.trim().to_string();
    text_field(&mut errors, "description", &input.description, DESCRIPTION_MAX);
    errors.check(positive_cents("total_amount", input.total_cents));
    errors.check(amount_in_range("total_amount", input.total_cents));
    errors.into_result(input)
}

/// Purchase invoice: the supplier's point of sale and number zero-filled.
pub fn clean_purchase_invoice(
    mut input: PurchaseInvoiceInput,
) -> Result<PurchaseInvoiceInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    input.point_of_sale = collect_number(
        &mut errors,
        "point_of_sale",
        &input.point_of_sale,
        POS_NUMBER_WIDTH,
    );
    input.number = collect_number(&mut errors, "number", &input.number, DOCUMENT_NUMBER_WIDTH);
    for line in input.lines.iter_mut() {
        line.description = line.description.trim().to_string();
    }
    check_invoice_lines(&mut errors, &input.lines);
    errors.into_result(input)
}

pub fn clean_purchase_receipt(
    mut input: PurchaseReceiptInput,
) -> Result<PurchaseReceiptInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    input.point_of_sale = collect_number(
        &mut errors,
        "point_of_sale",
        &input.point_of_sale,
        POS_NUMBER_WIDTH,
    );
    input.number = collect_number(&mut errors, "number", &input.number, DOCUMENT_NUMBER_WIDTH);
    input.description = input.description.trim().to_string();
    text_field(&mut errors, "description", &input.description, DESCRIPTION_MAX);
    errors.check(positive_cents("total_amount", input.total_cents));
    errors.check(amount_in_range("total_amount", input.total_cents));
    errors.into_result(input)
}

/// Journal entry: description required, debit and credit within range.
/// Balance is checked separately, see `bookkeeping::check_balanced`.
pub fn clean_journal_entry(
    mut input: JournalEntryInput,
) -> Result<JournalEntryInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    input.description = input.description.trim().to_string();
    text_field(&mut errors, "description", &input.description, ENTRY_DESCRIPTION_MAX);
    for line in &input.lines {
        errors.check(amount_in_range("debit", line.debit_cents));
        errors.check(amount_in_range("credit", line.credit_cents));
    }
    errors.into_result(input)
}

/// Digits of at most `width`, zero-filled. Failures go to `errors`.
fn collect_number(errors: &mut ValidationErrors, field: &str, value: &str, width: usize) -> String {
    let value = value.trim();
    digits_field(errors, field, value, width);
    zero_fill(value, width)
}

pub fn clean_chart_category(
    mut input: ChartCategoryInput,
) -> Result<ChartCategoryInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let code = input.code.trim().to_string();
    digits_field(&mut errors, "code", &code, CATEGORY_CODE_WIDTH);
    input.code = zero_fill(&code, CATEGORY_CODE_WIDTH);
    input.name = input.name.trim().to_string();
    text_field(&mut errors, "name", &input.name, NAME_MAX);
    errors.into_result(input)
}

pub fn clean_chart_account(
    mut input: ChartAccountInput,
) -> Result<ChartAccountInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    input.code = input.code.trim().to_string();
    digits_field(&mut errors, "code", &input.code, ACCOUNT_CODE_MAX);
    input.name = input.name.trim().to_string();
    text_field(&mut errors, "name", &input.name, NAME_MAX);
    errors.check(required("category_id", &input.category_id));
    errors.into_result(input)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JournalLineInput;

    fn person(tax_number: &str, email: &str) -> PersonInput {
        PersonInput {
            tax_number: tax_number.to_string(),
            name: "Acme".to_string(),
            address: "Main St 1".to_string(),
            email: email.to_string(),
            phone: "5491100000000".to_string(),
        }
    }

    #[test]
    fn test_only_digits() {
        assert!(only_digits("n", "0001").is_ok());
        assert!(only_digits("n", "").is_err());
        assert!(only_digits("n", "12a").is_err());
        assert!(only_digits("n", "-1").is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("email", "info@acme.com").is_ok());
        assert!(email("email", "info@acme").is_err());
        assert!(email("email", "@acme.com").is_err());
        assert!(email("email", "info acme@x.com").is_err());
        assert!(email("email", "a@b@c.com").is_err());
        assert!(email("email", "a@b..com").is_err());
    }

    #[test]
    fn test_clean_person_collects_every_failure() {
        let errors = clean_person(person("20-301", "nope")).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["tax_number", "email"]);

        let errors = clean_person(person("123456789012", "info@acme.com")).unwrap_err();
        assert!(matches!(
            errors.iter().next(),
            Some(ValidationError::TooLong { max: 11, .. })
        ));
    }

    #[test]
    fn test_clean_person_trims() {
        let mut input = person(" 20301234567 ", "info@acme.com");
        input.name = "  Acme  ".to_string();
        let cleaned = clean_person(input).unwrap();
        assert_eq!(cleaned.tax_number, "20301234567");
        assert_eq!(cleaned.name, "Acme");
    }

    #[test]
    fn test_clean_document_number() {
        assert_eq!(clean_document_number("number", "42").unwrap(), "00000042");
        assert_eq!(
            clean_document_number("number", "00000042").unwrap(),
            "00000042"
        );
        assert!(clean_document_number("number", "123456789").is_err());
        assert!(clean_document_number("number", "4a").is_err());
        assert!(clean_document_number("number", "").is_err());
    }

    #[test]
    fn test_clean_document_type() {
        let cleaned = clean_document_type(DocumentTypeInput {
            code: "1".to_string(),
            doc_type: "fa".to_string(),
            description: "Factura a".to_string(),
            hide: false,
        })
        .unwrap();
        assert_eq!(cleaned.code, "001");
        assert_eq!(cleaned.doc_type, "FA");
        assert_eq!(cleaned.description, "FACTURA A");

        let errors = clean_document_type(DocumentTypeInput {
            code: "1000".to_string(),
            doc_type: "F1".to_string(),
            description: String::new(),
            hide: true,
        })
        .unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_clean_payment_term() {
        let days = clean_payment_term(&PaymentTermInput {
            days: "030".to_string(),
        })
        .unwrap();
        assert_eq!(days, 30);
        assert!(clean_payment_term(&PaymentTermInput {
            days: "1000".to_string()
        })
        .is_err());
    }

    #[test]
    fn test_clean_financial_year() {
        let ok = clean_financial_year(FinancialYearInput {
            year: "2024".to_string(),
            current: false,
        });
        assert!(ok.is_ok());
        assert!(clean_financial_year(FinancialYearInput {
            year: "24".to_string(),
            current: false,
        })
        .is_err());
    }

    #[test]
    fn test_clean_sale_receipt() {
        let input = SaleReceiptInput {
            issue_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            point_of_sale_id: "p".to_string(),
            number: "7".to_string(),
            related_invoice_id: "i".to_string(),
            recipient_id: None,
            description: " First payment ".to_string(),
            total_cents: 1000,
        };
        let cleaned = clean_sale_receipt(input.clone()).unwrap();
        assert_eq!(cleaned.number, "00000007");
        assert_eq!(cleaned.description, "First payment");

        let errors = clean_sale_receipt(SaleReceiptInput {
            description: String::new(),
            total_cents: 0,
            ..input
        })
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["description", "total_amount"]);
    }

    #[test]
    fn test_clean_sale_invoice_requires_lines() {
        let errors = clean_sale_invoice(SaleInvoiceInput {
            issue_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            doc_type_id: "t".to_string(),
            point_of_sale_id: "p".to_string(),
            number: "1".to_string(),
            recipient_id: "c".to_string(),
            payment_method_id: "m".to_string(),
            payment_term_id: "t".to_string(),
            lines: Vec::new(),
        })
        .unwrap_err();
        assert_eq!(errors.iter().next().map(|e| e.field()), Some("lines"));
    }

    #[test]
    fn test_amounts_out_of_range() {
        assert!(amount_in_range("total_amount", 999_999_999_999_999).is_ok());
        assert!(amount_in_range("total_amount", -999_999_999_999_999).is_ok());
        assert!(amount_in_range("total_amount", AMOUNT_LIMIT_CENTS).is_err());
        assert!(amount_in_range("total_amount", i64::MIN).is_err());

        let huge = InvoiceLineInput {
            description: "Huge".to_string(),
            taxable_cents: i64::MAX,
            not_taxable_cents: 0,
            vat_cents: 1,
        };
        let errors = clean_sale_invoice(SaleInvoiceInput {
            issue_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            doc_type_id: "t".to_string(),
            point_of_sale_id: "p".to_string(),
            number: "1".to_string(),
            recipient_id: "c".to_string(),
            payment_method_id: "m".to_string(),
            payment_term_id: "t".to_string(),
            lines: vec![huge],
        })
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["taxable_amount"]);
    }

    #[test]
    fn test_lines_in_range_with_total_out_of_range() {
        let line = |cents| InvoiceLineInput {
            description: "Part".to_string(),
            taxable_cents: cents,
            not_taxable_cents: 0,
            vat_cents: cents,
        };
        let mut errors = ValidationErrors::new();
        check_invoice_lines(&mut errors, &[line(600_000_000_000_000)]);
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["total_amount"]);
    }

    #[test]
    fn test_clean_journal_entry() {
        let input = JournalEntryInput {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: " Capital contribution ".to_string(),
            lines: vec![
                JournalLineInput {
                    account_id: "a".to_string(),
                    debit_cents: 1000,
                    credit_cents: 0,
                },
                JournalLineInput {
                    account_id: "b".to_string(),
                    debit_cents: 0,
                    credit_cents: 1000,
                },
            ],
        };
        let cleaned = clean_journal_entry(input.clone()).unwrap();
        assert_eq!(cleaned.description, "Capital contribution");

        let errors = clean_journal_entry(JournalEntryInput {
            description: "  ".to_string(),
            ..input.clone()
        })
        .unwrap_err();
        assert_eq!(errors.iter().next().map(|e| e.field()), Some("description"));

        let errors = clean_journal_entry(JournalEntryInput {
            description: "x".repeat(81),
            ..input.clone()
        })
        .unwrap_err();
        assert!(matches!(
            errors.iter().next(),
            Some(ValidationError::TooLong { max: 80, .. })
        ));

        let mut lines = input.lines.clone();
        lines[0].debit_cents = i64::MAX;
        let errors = clean_journal_entry(JournalEntryInput { lines, ..input }).unwrap_err();
        assert_eq!(errors.iter().next().map(|e| e.field()), Some("debit"));
    }

    #[test]
    fn test_clean_chart_category() {
        let cleaned = clean_chart_category(ChartCategoryInput {
            code: "1".to_string(),
            name: "Assets".to_string(),
        })
        .unwrap();
        assert_eq!(cleaned.code, "01");
    }
}
