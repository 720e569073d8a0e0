//! # Bulk Import
//!
//! Writes an uploaded sheet through the same helpers the repositories use,
//! inside one transaction.
//!
//! ## All or Nothing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    row 2  ok       ── written                                          │
//! │    row 3  fails    ── RowError kept, next row                          │
//! │    row 4  ok       ── written                                          │
//! │    row 5  fails    ── RowError kept                                    │
//! │  errors? ── yes ──► ROLLBACK, ImportError::Rows([row 3, row 5])        │
//! │         └─ no  ──► COMMIT, ImportSummary { created }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed statement only undoes itself in SQLite, so the transaction stays
//! usable and every row of the file gets checked.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use tally_core::import::{
    check_upload_name, parse_amount, parse_date, ImportError, ImportKind, ImportSummary, RowError,
    Sheet, SheetRow,
};
use tally_core::numbering::zero_fill;
use tally_core::{
    Company, InvoiceLineInput, PersonInput, PersonKind, SaleInvoiceInput, SaleReceiptInput,
    ValidationError, DOCUMENT_CODE_WIDTH, DOCUMENT_NUMBER_WIDTH, POS_NUMBER_WIDTH,
};

use crate::error::{DbError, DbResult};
use crate::repository::{
    company, document_type, payment, person, point_of_sale, sale_invoice, sale_receipt,
};

/// Invoice sheets hold one line per row; these columns identify the invoice.
const INVOICE_KEY: &[&str] = &["type", "point_of_sell", "number"];

/// Invoice-level cells every row of a group must repeat unchanged.
const INVOICE_HEADER: &[&str] = &[
    "issue_date",
    "sender",
    "recipient",
    "payment_method",
    "payment_term",
];

/// Runs bulk uploads.
#[derive(Debug, Clone)]
pub struct Importer {
    pool: SqlitePool,
}

impl Importer {
    /// Creates a new Importer.
    pub fn new(pool: SqlitePool) -> Self {
        Importer { pool }
    }

    /// Imports an upload. Either every record is created or none is.
    pub async fn import(
        &self,
        kind: ImportKind,
        filename: &str,
        bytes: &[u8],
    ) -> DbResult<ImportSummary> {
        check_upload_name(filename)?;
        let sheet = Sheet::from_csv(bytes)?;
        sheet.require_columns(kind.columns())?;

        let mut tx = self.pool.begin().await?;
        let company = company::require(&mut tx).await?;

        let mut errors = Vec::new();
        let created = match kind {
            ImportKind::Clients => {
                import_persons(&mut tx, PersonKind::Client, &sheet, &mut errors).await?
            }
            ImportKind::Suppliers => {
                import_persons(&mut tx, PersonKind::Supplier, &sheet, &mut errors).await?
            }
            ImportKind::SaleInvoices => {
                import_invoices(&mut tx, &company, &sheet, &mut errors).await?
            }
            ImportKind::SaleReceipts => {
                import_receipts(&mut tx, &company, &sheet, &mut errors).await?
            }
        };

        if !errors.is_empty() {
            tx.rollback().await?;
            warn!(
                kind = %kind,
                filename = %filename,
                errors = errors.len(),
                "Upload rejected"
            );
            return Err(ImportError::Rows(errors).into());
        }

        tx.commit().await?;
        info!(kind = %kind, filename = %filename, created, "Upload imported");
        Ok(ImportSummary { kind, created })
    }
}

// =============================================================================
// Row Checks
// =============================================================================

/// Failures of one row (or one invoice) while its cells are resolved.
struct RowCheck {
    row: usize,
    errors: Vec<RowError>,
}

impl RowCheck {
    fn new(row: usize) -> Self {
        RowCheck {
            row,
            errors: Vec::new(),
        }
    }

    fn parsed<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors
                    .push(RowError::field(self.row, err.field(), err.to_string()));
                None
            }
        }
    }

    fn found<T>(&mut self, column: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors
                .push(RowError::missing_reference(self.row, column));
        }
        value
    }
}

/// Turns a rule violation into row errors. Anything else aborts the upload.
fn row_errors(row: usize, err: DbError) -> DbResult<Vec<RowError>> {
    match err {
        DbError::Rejected(core) => Ok(RowError::from_core(row, &core)),
        DbError::UniqueViolation { ref field, .. } => {
            Ok(vec![RowError::field(row, field.clone(), err.to_string())])
        }
        DbError::Restricted { reason, .. } => Ok(vec![RowError::general(row, reason)]),
        DbError::NotFound { .. } => Ok(vec![RowError::general(row, err.to_string())]),
        other => Err(other),
    }
}

fn sender_is_company(company: &Company, row: &SheetRow<'_>) -> Option<()> {
    (row.get("sender") == company.tax_number).then_some(())
}

// =============================================================================
// Persons
// =============================================================================

async fn import_persons(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    sheet: &Sheet,
    errors: &mut Vec<RowError>,
) -> DbResult<usize> {
    let mut created = 0;
    for row in sheet.rows() {
        let input = PersonInput {
            tax_number: row.get("tax_number").to_string(),
            name: row.get("name").to_string(),
            address: row.get("address").to_string(),
            email: row.get("email").to_string(),
            phone: row.get("phone").to_string(),
        };
        match person::insert(conn, kind, input).await {
            Ok(_) => created += 1,
            Err(err) => errors.extend(row_errors(row.number, err)?),
        }
    }
    Ok(created)
}

// =============================================================================
// Sale Invoices
// =============================================================================

async fn import_invoices(
    conn: &mut SqliteConnection,
    company: &Company,
    sheet: &Sheet,
    errors: &mut Vec<RowError>,
) -> DbResult<usize> {
    let mut created = 0;
    for group in sheet.groups(INVOICE_KEY) {
        let first = group[0];
        let mut check = RowCheck::new(first.number);

        let issue_date = check.parsed(parse_date("issue_date", first.get("issue_date")));

        let code = zero_fill(first.get("type"), DOCUMENT_CODE_WIDTH);
        let doc_type = document_type::by_code(conn, &code).await?;
        let doc_type = check.found("type", doc_type);

        let pos_number = zero_fill(first.get("point_of_sell"), POS_NUMBER_WIDTH);
        let point = point_of_sale::by_number(conn, &pos_number).await?;
        let point = check.found("point_of_sell", point);

        check.found("sender", sender_is_company(company, &first));

        let client = person::by_tax_number(conn, PersonKind::Client, first.get("recipient")).await?;
        let client = check.found("recipient", client);

        let method = payment::method_by_name(conn, first.get("payment_method")).await?;
        let method = check.found("payment_method", method);

        let term = match first.get("payment_term").trim().parse::<i64>() {
            Ok(days) => payment::term_by_days(conn, days).await?,
            Err(_) => None,
        };
        let term = check.found("payment_term", term);

        for row in group.iter().skip(1) {
            for column in INVOICE_HEADER {
                let expected = first.get(column).trim();
                let value = row.get(column).trim();
                if !value.eq_ignore_ascii_case(expected) {
                    check.errors.push(RowError::field(
                        row.number,
                        *column,
                        format!(
                            "'{}' differs from '{}' in row {} of the same invoice.",
                            value, expected, first.number
                        ),
                    ));
                }
            }
        }

        let mut lines = Vec::with_capacity(group.len());
        for row in &group {
            let mut line_check = RowCheck::new(row.number);
            let taxable = line_check.parsed(parse_amount("taxable_amount", row.get("taxable_amount")));
            let not_taxable =
                line_check.parsed(parse_amount("not_taxable_amount", row.get("not_taxable_amount")));
            let vat = line_check.parsed(parse_amount("vat_amount", row.get("vat_amount")));
            check.errors.append(&mut line_check.errors);

            if let (Some(taxable), Some(not_taxable), Some(vat)) = (taxable, not_taxable, vat) {
                lines.push(InvoiceLineInput {
                    description: row.get("description").to_string(),
                    taxable_cents: taxable.cents(),
                    not_taxable_cents: not_taxable.cents(),
                    vat_cents: vat.cents(),
                });
            }
        }

        let resolved = match (issue_date, doc_type, point, client, method, term) {
            (Some(d), Some(t), Some(p), Some(c), Some(m), Some(pt)) if check.errors.is_empty() => {
                Some((d, t, p, c, m, pt))
            }
            _ => None,
        };
        let Some((issue_date, doc_type, point, client, method, term)) = resolved else {
            errors.append(&mut check.errors);
            continue;
        };

        let input = SaleInvoiceInput {
            issue_date,
            doc_type_id: doc_type.id,
            point_of_sale_id: point.id,
            number: first.get("number").to_string(),
            recipient_id: client.id,
            payment_method_id: method.id,
            payment_term_id: term.id,
            lines,
        };
        match sale_invoice::insert(conn, input).await {
            Ok(_) => created += 1,
            Err(err) => errors.extend(row_errors(first.number, err)?),
        }
    }
    Ok(created)
}

// =============================================================================
// Sale Receipts
// =============================================================================

async fn import_receipts(
    conn: &mut SqliteConnection,
    company: &Company,
    sheet: &Sheet,
    errors: &mut Vec<RowError>,
) -> DbResult<usize> {
    let mut created = 0;
    for row in sheet.rows() {
        let mut check = RowCheck::new(row.number);

        let issue_date = check.parsed(parse_date("issue_date", row.get("issue_date")));
        let total = check.parsed(parse_amount("total_amount", row.get("total_amount")));

        let pos_number = zero_fill(row.get("point_of_sell"), POS_NUMBER_WIDTH);
        let point = point_of_sale::by_number(conn, &pos_number).await?;
        let point = check.found("point_of_sell", point);

        check.found("sender", sender_is_company(company, &row));

        let client = person::by_tax_number(conn, PersonKind::Client, row.get("recipient")).await?;
        let client = check.found("recipient", client);

        let code = zero_fill(row.get("ri_type"), DOCUMENT_CODE_WIDTH);
        let ri_type = document_type::by_code(conn, &code).await?;
        let ri_type = check.found("ri_type", ri_type);

        let ri_pos_number = zero_fill(row.get("ri_pos"), POS_NUMBER_WIDTH);
        let ri_pos = point_of_sale::by_number(conn, &ri_pos_number).await?;
        let ri_pos = check.found("ri_pos", ri_pos);

        let invoice = match (&ri_type, &ri_pos) {
            (Some(t), Some(p)) => {
                let number = zero_fill(row.get("ri_number"), DOCUMENT_NUMBER_WIDTH);
                let invoice = sale_invoice::by_key(conn, &t.id, &p.id, &number).await?;
                check.found("ri_number", invoice)
            }
            _ => None,
        };

        let resolved = match (issue_date, total, point, client, invoice) {
            (Some(d), Some(t), Some(p), Some(c), Some(i)) if check.errors.is_empty() => {
                Some((d, t, p, c, i))
            }
            _ => None,
        };
        let Some((issue_date, total, point, client, invoice)) = resolved else {
            errors.append(&mut check.errors);
            continue;
        };

        let input = SaleReceiptInput {
            issue_date,
            point_of_sale_id: point.id,
            number: row.get("number").to_string(),
            related_invoice_id: invoice.id,
            recipient_id: Some(client.id),
            description: row.get("description").to_string(),
            total_cents: total.cents(),
        };
        match sale_receipt::insert(conn, input).await {
            Ok(_) => created += 1,
            Err(err) => errors.extend(row_errors(row.number, err)?),
        }
    }
    Ok(created)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::ledger;
    use tally_core::SaleInvoiceFilter;

    const INVOICES: &str = "\
issue_date,type,point_of_sell,number,sender,recipient,payment_method,payment_term,description,taxable_amount,not_taxable_amount,vat_amount
01/02/2024,1,1,1,30111111118,20111111112,cash,30,Consulting,1000.00,0,210.00
01/02/2024,1,1,1,30111111118,20111111112,cash,30,Travel,0,50.50,0
05/02/2024,1,1,2,30111111118,20111111112,Cash,30,Consulting,300,0,0
";

    fn messages(err: DbError) -> Vec<String> {
        match err {
            DbError::Import(err) => err.messages(),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_import_clients() {
        let ledger = ledger().await;
        let csv = "Tax Number,Name,Address,Email,Phone\n\
                   20333333334,Globex,Elm 1,a@globex.test,111\n\
                   20444444445,Initech,Elm 2,b@initech.test,222\n";

        let summary = ledger
            .db
            .importer()
            .import(ImportKind::Clients, "clients.csv", csv.as_bytes())
            .await
            .unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(ledger.db.clients().list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_rows_roll_back_everything() {
        let ledger = ledger().await;
        let csv = "tax_number,name,address,email,phone\n\
                   20333333334,Globex,Elm 1,a@globex.test,111\n\
                   20111111112,Acme again,Elm 2,b@acme.test,222\n\
                   20444444445,Initech,Elm 3,not-an-email,333\n";

        let err = ledger
            .db
            .importer()
            .import(ImportKind::Clients, "clients.csv", csv.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "Row 3, tax_number: Duplicate tax_number: '20111111112' already exists".to_string(),
                "Row 4, email: Enter a valid email address.".to_string(),
            ]
        );
        assert_eq!(ledger.db.clients().list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_invoices_groups_lines() {
        let ledger = ledger().await;
        let summary = ledger
            .db
            .importer()
            .import(ImportKind::SaleInvoices, "invoices.csv", INVOICES.as_bytes())
            .await
            .unwrap();
        assert_eq!(summary.created, 2);

        let rows = ledger
            .db
            .sale_invoices()
            .list(&SaleInvoiceFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let first = rows.iter().find(|r| r.number == "00000001").unwrap();
        assert_eq!(first.total_cents, 126_050);
    }

    #[tokio::test]
    async fn test_grouped_rows_must_repeat_the_invoice_cells() {
        let ledger = ledger().await;
        let csv = "\
issue_date,type,point_of_sell,number,sender,recipient,payment_method,payment_term,description,taxable_amount,not_taxable_amount,vat_amount
01/02/2024,1,1,1,30111111118,20111111112,Cash,30,Consulting,1000,0,0
02/02/2024,1,1,1,30111111118,20111111112,cash,60,Travel,500,0,0
";
        let err = ledger
            .db
            .importer()
            .import(ImportKind::SaleInvoices, "invoices.csv", csv.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "Row 3, issue_date: '02/02/2024' differs from '01/02/2024' in row 2 of the same invoice."
                    .to_string(),
                "Row 3, payment_term: '60' differs from '30' in row 2 of the same invoice."
                    .to_string(),
            ]
        );
        assert!(ledger
            .db
            .sale_invoices()
            .list(&SaleInvoiceFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_huge_amount_is_a_row_error() {
        let ledger = ledger().await;
        let csv = "\
issue_date,type,point_of_sell,number,sender,recipient,payment_method,payment_term,description,taxable_amount,not_taxable_amount,vat_amount
01/02/2024,1,1,1,30111111118,20111111112,Cash,30,Huge,92233720368547758.07,0,1
";
        let err = ledger
            .db
            .importer()
            .import(ImportKind::SaleInvoices, "invoices.csv", csv.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "Row 2, taxable_amount: taxable_amount must have at most 13 digits before the decimal point"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_references() {
        let ledger = ledger().await;
        let csv = "\
issue_date,type,point_of_sell,number,sender,recipient,payment_method,payment_term,description,taxable_amount,not_taxable_amount,vat_amount
01/02/2024,1,9,1,30111111118,20999999999,Cash,30,Consulting,1000,0,0
";
        let err = ledger
            .db
            .importer()
            .import(ImportKind::SaleInvoices, "invoices.csv", csv.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "The input in row 2 and column point_of_sell doesn't exist in the records."
                    .to_string(),
                "The input in row 2 and column recipient doesn't exist in the records."
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_import_receipts() {
        let ledger = ledger().await;
        let importer = ledger.db.importer();
        importer
            .import(ImportKind::SaleInvoices, "invoices.csv", INVOICES.as_bytes())
            .await
            .unwrap();

        let csv = "\
issue_date,point_of_sell,number,sender,recipient,description,total_amount,ri_type,ri_pos,ri_number
10/02/2024,1,1,30111111118,20111111112,Transfer,1260.50,1,1,1
11/02/2024,1,2,30111111118,20111111112,Transfer,400,1,1,2
";
        let err = importer
            .import(ImportKind::SaleReceipts, "receipts.csv", csv.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "Row 3, general: Receipt total amount cannot be higher than invoice total amount."
                    .to_string()
            ]
        );

        let csv = csv.replace(",400,", ",300,");
        let summary = importer
            .import(ImportKind::SaleReceipts, "receipts.csv", csv.as_bytes())
            .await
            .unwrap();
        assert_eq!(summary.created, 2);

        let invoices = ledger
            .db
            .sale_invoices()
            .list(&SaleInvoiceFilter::default())
            .await
            .unwrap();
        assert!(invoices.iter().all(|i| i.collected));
    }

    #[tokio::test]
    async fn test_rejected_files() {
        let ledger = ledger().await;
        let importer = ledger.db.importer();

        assert!(matches!(
            importer.import(ImportKind::Clients, "clients.xlsx", b"").await,
            Err(DbError::Import(ImportError::UnsupportedSpreadsheet(_)))
        ));
        assert!(matches!(
            importer
                .import(ImportKind::Clients, "clients.csv", b"tax_number,name\n1,a\n")
                .await,
            Err(DbError::Import(ImportError::WrongColumns { .. }))
        ));
    }
}
