//! # Purchase Repository
//!
//! Invoices received from suppliers and the receipts paying them.
//!
//! ## Differences From Sales
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    sale                    purchase                     │
//! │  point of sale     own (reference)         supplier's (5-digit text)    │
//! │  sender            company                 supplier                     │
//! │  recipient         client                  company                      │
//! │  unique key        (type, pos, number)     (supplier, type, pos, num)   │
//! │  numbering gaps    checked                 not checked                  │
//! │  account           client, +invoice        supplier, +invoice           │
//! │                           -receipt                   -receipt           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts follow the same amount rules as sale receipts and always
//! belong to the supplier of the invoice they pay.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::calendar::check_in_current_year;
use tally_core::collection::{check_invoice_covers_receipts, check_receipt_amount};
use tally_core::validation::{clean_purchase_invoice, clean_purchase_receipt};
use tally_core::{
    lines_total, Money, PersonKind, PurchaseInvoice, PurchaseInvoiceInput, PurchaseInvoiceRow,
    PurchaseReceipt, PurchaseReceiptInput,
};

use crate::error::{DbError, DbResult};
use crate::repository::{company, current_account, financial_year, lines, person, require_exists};

const INVOICE_COLUMNS: &str = r#"
    id, issue_date, doc_type_id, point_of_sale, number, sender_id,
    payment_method_id, payment_term_id, created_at, updated_at
"#;

const RECEIPT_COLUMNS: &str = r#"
    id, issue_date, point_of_sale, number, related_invoice_id, sender_id,
    description, total_cents, created_at, updated_at
"#;

const ROW_SELECT: &str = r#"
    SELECT
        pi.id,
        pi.issue_date,
        dt.doc_type || ' ' || pi.point_of_sale || '-' || pi.number AS label,
        pi.sender_id,
        s.name AS supplier_name,
        COALESCE((SELECT SUM(l.total_cents) FROM purchase_invoice_lines l
                  WHERE l.invoice_id = pi.id), 0) AS total_cents,
        COALESCE((SELECT SUM(r.total_cents) FROM purchase_receipts r
                  WHERE r.related_invoice_id = pi.id), 0) AS paid_cents
    FROM purchase_invoices pi
    JOIN document_types dt ON dt.id = pi.doc_type_id
    JOIN suppliers s ON s.id = pi.sender_id
"#;

/// Repository for purchase invoices and receipts.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    // =========================================================================
    // Invoices
    // =========================================================================

    /// Lists invoices, newest first. `supplier_id` narrows to one supplier.
    pub async fn list_invoices(
        &self,
        supplier_id: Option<&str>,
    ) -> DbResult<Vec<PurchaseInvoiceRow>> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR pi.sender_id = ?1) ORDER BY pi.issue_date DESC, s.name, pi.number DESC",
            ROW_SELECT
        );
        let rows = sqlx::query_as::<_, PurchaseInvoiceRow>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_invoice(&self, id: &str) -> DbResult<Option<PurchaseInvoice>> {
        let mut conn = self.pool.acquire().await?;
        fetch_invoice(&mut conn, id).await
    }

    pub async fn create_invoice(&self, input: PurchaseInvoiceInput) -> DbResult<PurchaseInvoice> {
        let input = clean_purchase_invoice(input)?;
        let mut tx = self.pool.begin().await?;
        check_invoice_rules(&mut tx, &input).await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        debug!(
            id = %id,
            supplier_id = %input.sender_id,
            number = %input.number,
            "Creating purchase invoice"
        );

        sqlx::query(
            r#"
            INSERT INTO purchase_invoices (
                id, issue_date, doc_type_id, point_of_sale, number, sender_id,
                payment_method_id, payment_term_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(input.issue_date)
        .bind(&input.doc_type_id)
        .bind(&input.point_of_sale)
        .bind(&input.number)
        .bind(&input.sender_id)
        .bind(&input.payment_method_id)
        .bind(&input.payment_term_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_duplicate(e, "number", input.number.clone()))?;

        let written = lines::replace(&mut tx, lines::PURCHASE_LINES, &id, &input.lines).await?;
        let total: Money = written.iter().map(|l| Money::from_cents(l.total_cents)).sum();
        current_account::record_invoice(
            &mut tx,
            PersonKind::Supplier,
            &input.sender_id,
            &id,
            input.issue_date,
            total,
        )
        .await?;

        tx.commit().await?;
        Ok(PurchaseInvoice {
            id,
            issue_date: input.issue_date,
            doc_type_id: input.doc_type_id,
            point_of_sale: input.point_of_sale,
            number: input.number,
            sender_id: input.sender_id,
            payment_method_id: input.payment_method_id,
            payment_term_id: input.payment_term_id,
            created_at: now,
            updated_at: now,
            lines: written,
        })
    }

    pub async fn update_invoice(
        &self,
        id: &str,
        input: PurchaseInvoiceInput,
    ) -> DbResult<PurchaseInvoice> {
        let input = clean_purchase_invoice(input)?;
        let mut tx = self.pool.begin().await?;

        let existing = fetch_invoice(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseInvoice", id))?;
        check_invoice_rules(&mut tx, &input).await?;

        let paid = receipts_total(&mut tx, id, None).await?;
        check_invoice_covers_receipts(lines_total(&input.lines)?, paid)?;
        if !paid.is_zero() && existing.sender_id != input.sender_id {
            return Err(DbError::restricted(
                "PurchaseInvoice",
                "The supplier of an invoice with receipts cannot be changed.",
            ));
        }

        debug!(id = %id, number = %input.number, "Updating purchase invoice");

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE purchase_invoices SET
                issue_date = ?1, doc_type_id = ?2, point_of_sale = ?3, number = ?4,
                sender_id = ?5, payment_method_id = ?6, payment_term_id = ?7,
                updated_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(input.issue_date)
        .bind(&input.doc_type_id)
        .bind(&input.point_of_sale)
        .bind(&input.number)
        .bind(&input.sender_id)
        .bind(&input.payment_method_id)
        .bind(&input.payment_term_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_duplicate(e, "number", input.number.clone()))?;

        let written = lines::replace(&mut tx, lines::PURCHASE_LINES, id, &input.lines).await?;
        let total: Money = written.iter().map(|l| Money::from_cents(l.total_cents)).sum();
        current_account::record_invoice(
            &mut tx,
            PersonKind::Supplier,
            &input.sender_id,
            id,
            input.issue_date,
            total,
        )
        .await?;

        tx.commit().await?;
        Ok(PurchaseInvoice {
            issue_date: input.issue_date,
            doc_type_id: input.doc_type_id,
            point_of_sale: input.point_of_sale,
            number: input.number,
            sender_id: input.sender_id,
            payment_method_id: input.payment_method_id,
            payment_term_id: input.payment_term_id,
            updated_at: now,
            lines: written,
            ..existing
        })
    }

    pub async fn delete_invoice(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        fetch_invoice(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseInvoice", id))?;

        let receipts: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM purchase_receipts WHERE related_invoice_id = ?1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if receipts > 0 {
            warn!(id = %id, receipts, "Refusing to delete purchase invoice with receipts");
            return Err(DbError::restricted(
                "PurchaseInvoice",
                "The invoice you're trying to delete has related receipts.",
            ));
        }

        sqlx::query("DELETE FROM purchase_invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id = %id, "Deleted purchase invoice");
        Ok(())
    }

    // =========================================================================
    // Receipts
    // =========================================================================

    /// Lists receipts, newest first. `invoice_id` narrows to one invoice.
    pub async fn list_receipts(&self, invoice_id: Option<&str>) -> DbResult<Vec<PurchaseReceipt>> {
        let sql = format!(
            r#"
            SELECT {} FROM purchase_receipts
            WHERE (?1 IS NULL OR related_invoice_id = ?1)
            ORDER BY issue_date DESC, point_of_sale, number DESC
            "#,
            RECEIPT_COLUMNS
        );
        let receipts = sqlx::query_as::<_, PurchaseReceipt>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(receipts)
    }

    pub async fn get_receipt(&self, id: &str) -> DbResult<Option<PurchaseReceipt>> {
        let mut conn = self.pool.acquire().await?;
        fetch_receipt(&mut conn, id).await
    }

    pub async fn create_receipt(&self, input: PurchaseReceiptInput) -> DbResult<PurchaseReceipt> {
        let input = clean_purchase_receipt(input)?;
        let mut tx = self.pool.begin().await?;
        let supplier_id = check_receipt_rules(&mut tx, &input, None).await?;

        let now = Utc::now();
        let receipt = PurchaseReceipt {
            id: Uuid::new_v4().to_string(),
            issue_date: input.issue_date,
            point_of_sale: input.point_of_sale,
            number: input.number,
            related_invoice_id: input.related_invoice_id,
            sender_id: supplier_id,
            description: input.description,
            total_cents: input.total_cents,
            created_at: now,
            updated_at: now,
        };

        debug!(
            id = %receipt.id,
            invoice_id = %receipt.related_invoice_id,
            "Creating purchase receipt"
        );

        sqlx::query(
            r#"
            INSERT INTO purchase_receipts (
                id, issue_date, point_of_sale, number, related_invoice_id,
                sender_id, description, total_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&receipt.id)
        .bind(receipt.issue_date)
        .bind(&receipt.point_of_sale)
        .bind(&receipt.number)
        .bind(&receipt.related_invoice_id)
        .bind(&receipt.sender_id)
        .bind(&receipt.description)
        .bind(receipt.total_cents)
        .bind(receipt.created_at)
        .bind(receipt.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_duplicate(e, "number", receipt.number.clone()))?;

        current_account::record_receipt(
            &mut tx,
            PersonKind::Supplier,
            &receipt.sender_id,
            &receipt.id,
            receipt.issue_date,
            Money::from_cents(receipt.total_cents),
        )
        .await?;

        tx.commit().await?;
        Ok(receipt)
    }

    pub async fn update_receipt(
        &self,
        id: &str,
        input: PurchaseReceiptInput,
    ) -> DbResult<PurchaseReceipt> {
        let input = clean_purchase_receipt(input)?;
        let mut tx = self.pool.begin().await?;

        let existing = fetch_receipt(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseReceipt", id))?;
        let supplier_id = check_receipt_rules(&mut tx, &input, Some(id)).await?;

        debug!(id = %id, invoice_id = %input.related_invoice_id, "Updating purchase receipt");

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE purchase_receipts SET
                issue_date = ?1, point_of_sale = ?2, number = ?3, related_invoice_id = ?4,
                sender_id = ?5, description = ?6, total_cents = ?7, updated_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(input.issue_date)
        .bind(&input.point_of_sale)
        .bind(&input.number)
        .bind(&input.related_invoice_id)
        .bind(&supplier_id)
        .bind(&input.description)
        .bind(input.total_cents)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_duplicate(e, "number", input.number.clone()))?;

        current_account::record_receipt(
            &mut tx,
            PersonKind::Supplier,
            &supplier_id,
            id,
            input.issue_date,
            Money::from_cents(input.total_cents),
        )
        .await?;

        tx.commit().await?;
        Ok(PurchaseReceipt {
            issue_date: input.issue_date,
            point_of_sale: input.point_of_sale,
            number: input.number,
            related_invoice_id: input.related_invoice_id,
            sender_id: supplier_id,
            description: input.description,
            total_cents: input.total_cents,
            updated_at: now,
            ..existing
        })
    }

    pub async fn delete_receipt(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM purchase_receipts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PurchaseReceipt", id));
        }
        info!(id = %id, "Deleted purchase receipt");
        Ok(())
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

async fn fetch_invoice(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<PurchaseInvoice>> {
    let sql = format!("SELECT {} FROM purchase_invoices WHERE id = ?1", INVOICE_COLUMNS);
    let invoice = sqlx::query_as::<_, PurchaseInvoice>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match invoice {
        Some(mut invoice) => {
            invoice.lines = lines::fetch(conn, lines::PURCHASE_LINES, id).await?;
            Ok(Some(invoice))
        }
        None => Ok(None),
    }
}

async fn fetch_receipt(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<PurchaseReceipt>> {
    let sql = format!("SELECT {} FROM purchase_receipts WHERE id = ?1", RECEIPT_COLUMNS);
    let receipt = sqlx::query_as::<_, PurchaseReceipt>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(receipt)
}

async fn receipts_total(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    exclude_receipt: Option<&str>,
) -> DbResult<Money> {
    let cents: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_cents), 0) FROM purchase_receipts
        WHERE related_invoice_id = ?1 AND id <> ?2
        "#,
    )
    .bind(invoice_id)
    .bind(exclude_receipt.unwrap_or(""))
    .fetch_one(&mut *conn)
    .await?;
    Ok(Money::from_cents(cents))
}

async fn check_invoice_rules(
    conn: &mut SqliteConnection,
    input: &PurchaseInvoiceInput,
) -> DbResult<()> {
    company::require(conn).await?;

    let current = financial_year::current(conn).await?;
    check_in_current_year(input.issue_date, current.as_ref())?;

    require_exists(conn, "document_types", "DocumentType", &input.doc_type_id).await?;
    person::fetch(conn, PersonKind::Supplier, &input.sender_id)
        .await?
        .ok_or_else(|| DbError::not_found("Supplier", &input.sender_id))?;
    require_exists(conn, "payment_methods", "PaymentMethod", &input.payment_method_id).await?;
    require_exists(conn, "payment_terms", "PaymentTerm", &input.payment_term_id).await?;
    Ok(())
}

/// Returns the supplier of the related invoice.
async fn check_receipt_rules(
    conn: &mut SqliteConnection,
    input: &PurchaseReceiptInput,
    exclude_id: Option<&str>,
) -> DbResult<String> {
    company::require(conn).await?;

    let current = financial_year::current(conn).await?;
    check_in_current_year(input.issue_date, current.as_ref())?;

    let invoice = fetch_invoice(conn, &input.related_invoice_id)
        .await?
        .ok_or_else(|| DbError::not_found("PurchaseInvoice", &input.related_invoice_id))?;

    let others = receipts_total(conn, &invoice.id, exclude_id).await?;
    check_receipt_amount(Money::from_cents(input.total_cents), invoice.total(), others)?;

    Ok(invoice.sender_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
