//! # Sale Receipt Repository
//!
//! Receipts settle sale invoices. Every write recomputes the `collected`
//! flag of the invoices it touches.
//!
//! ## Collected Flag Maintenance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(receipt → A)          refresh A                                 │
//! │  update(receipt A → A)        refresh A                                 │
//! │  update(receipt A → B)        refresh B, refresh A                      │
//! │  delete(receipt → A)          refresh A                                 │
//! │                                                                         │
//! │  refresh X: collected = total(X) - sum(receipts of X) == 0             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::calendar::check_in_current_year;
use tally_core::collection::check_receipt_amount;
use tally_core::numbering::{
    check_date_correlation, following_number, next_in_series, previous_number, DocumentKind,
};
use tally_core::validation::clean_sale_receipt;
use tally_core::{
    Company, CoreError, Money, PersonKind, SaleReceipt, SaleReceiptFilter, SaleReceiptInput,
    SaleReceiptRow,
};

use crate::error::{DbError, DbResult};
use crate::repository::{company, current_account, financial_year, point_of_sale, sale_invoice};

const RECEIPT_COLUMNS: &str = r#"
    id, issue_date, point_of_sale_id, number, related_invoice_id, sender_id,
    recipient_id, description, total_cents, created_at, updated_at
"#;

/// Listing row with both the receipt and the invoice labels.
pub(crate) const ROW_SELECT: &str = r#"
    SELECT
        sr.id,
        sr.issue_date,
        p.pos_number || '-' || sr.number AS label,
        sr.point_of_sale_id,
        sr.number,
        sr.related_invoice_id,
        dt.doc_type || ' ' || ip.pos_number || '-' || si.number AS invoice_label,
        sr.recipient_id,
        c.name AS client_name,
        c.tax_number AS client_tax_number,
        sr.total_cents
    FROM sale_receipts sr
    JOIN points_of_sale p ON p.id = sr.point_of_sale_id
    JOIN sale_invoices si ON si.id = sr.related_invoice_id
    JOIN document_types dt ON dt.id = si.doc_type_id
    JOIN points_of_sale ip ON ip.id = si.point_of_sale_id
    JOIN clients c ON c.id = sr.recipient_id
"#;

/// Newest first, then point of sale and number descending.
pub(crate) const ROW_ORDER: &str = " ORDER BY sr.issue_date DESC, p.pos_number, sr.number DESC";

/// Repository for sale receipt database operations.
#[derive(Debug, Clone)]
pub struct SaleReceiptRepository {
    pool: SqlitePool,
}

impl SaleReceiptRepository {
    /// Creates a new SaleReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleReceiptRepository { pool }
    }

    /// Searches receipts. `related_invoice` matches part of the invoice label.
    pub async fn list(&self, filter: &SaleReceiptFilter) -> DbResult<Vec<SaleReceiptRow>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(ROW_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(label) = &filter.related_invoice {
            query
                .push(" AND (dt.doc_type || ' ' || ip.pos_number || '-' || si.number) LIKE ")
                .push_bind(format!("%{}%", label.trim()));
        }
        if let Some(point_of_sale_id) = &filter.point_of_sale_id {
            query
                .push(" AND sr.point_of_sale_id = ")
                .push_bind(point_of_sale_id.clone());
        }
        if let Some(number) = &filter.number {
            query
                .push(" AND sr.number LIKE ")
                .push_bind(format!("%{}%", number.trim()));
        }
        if let Some(tax_number) = &filter.client_tax_number {
            query
                .push(" AND c.tax_number LIKE ")
                .push_bind(format!("{}%", tax_number.trim()));
        }
        if let Some(name) = &filter.client_name {
            query
                .push(" AND c.name LIKE ")
                .push_bind(format!("%{}%", name.trim()));
        }
        if let Some(year) = filter.year {
            query
                .push(" AND strftime('%Y', sr.issue_date) = ")
                .push_bind(format!("{:04}", year));
        }
        if let Some(month) = filter.month {
            query
                .push(" AND strftime('%m', sr.issue_date) = ")
                .push_bind(format!("{:02}", month));
        }
        query.push(ROW_ORDER);

        let rows = query
            .build_query_as::<SaleReceiptRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn row(&self, id: &str) -> DbResult<Option<SaleReceiptRow>> {
        let sql = format!("{} WHERE sr.id = ?1", ROW_SELECT);
        let row = sqlx::query_as::<_, SaleReceiptRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<SaleReceipt>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Number the next receipt of the point of sale should take.
    pub async fn next_number(&self, point_of_sale_id: &str) -> DbResult<String> {
        let last: Option<String> =
            sqlx::query_scalar("SELECT MAX(number) FROM sale_receipts WHERE point_of_sale_id = ?1")
                .bind(point_of_sale_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(next_in_series(last.as_deref()))
    }

    pub async fn create(&self, input: SaleReceiptInput) -> DbResult<SaleReceipt> {
        let mut tx = self.pool.begin().await?;
        let receipt = insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(receipt)
    }

    /// Updates a receipt, possibly moving it to another invoice.
    pub async fn update(&self, id: &str, input: SaleReceiptInput) -> DbResult<SaleReceipt> {
        let input = clean_sale_receipt(input)?;
        let mut tx = self.pool.begin().await?;

        let existing = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("SaleReceipt", id))?;
        let (_, recipient_id) = check_rules(&mut tx, &input, Some(id)).await?;

        debug!(
            id = %id,
            from_invoice = %existing.related_invoice_id,
            to_invoice = %input.related_invoice_id,
            "Updating sale receipt"
        );

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE sale_receipts SET
                issue_date = ?1, point_of_sale_id = ?2, number = ?3,
                related_invoice_id = ?4, recipient_id = ?5, description = ?6,
                total_cents = ?7, updated_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(input.issue_date)
        .bind(&input.point_of_sale_id)
        .bind(&input.number)
        .bind(&input.related_invoice_id)
        .bind(&recipient_id)
        .bind(&input.description)
        .bind(input.total_cents)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_duplicate(e, "number", input.number.clone()))?;

        current_account::record_receipt(
            &mut tx,
            PersonKind::Client,
            &recipient_id,
            id,
            input.issue_date,
            Money::from_cents(input.total_cents),
        )
        .await?;

        sale_invoice::refresh_collected(&mut tx, &input.related_invoice_id).await?;
        if existing.related_invoice_id != input.related_invoice_id {
            sale_invoice::refresh_collected(&mut tx, &existing.related_invoice_id).await?;
        }

        tx.commit().await?;
        Ok(SaleReceipt {
            issue_date: input.issue_date,
            point_of_sale_id: input.point_of_sale_id,
            number: input.number,
            related_invoice_id: input.related_invoice_id,
            recipient_id,
            description: input.description,
            total_cents: input.total_cents,
            updated_at: now,
            ..existing
        })
    }

    /// Deletes a receipt; its invoice may become uncollected again.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("SaleReceipt", id))?;

        sqlx::query("DELETE FROM sale_receipts WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sale_invoice::refresh_collected(&mut tx, &existing.related_invoice_id).await?;

        tx.commit().await?;
        info!(id = %id, invoice_id = %existing.related_invoice_id, "Deleted sale receipt");
        Ok(())
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SaleReceipt>> {
    let sql = format!("SELECT {} FROM sale_receipts WHERE id = ?1", RECEIPT_COLUMNS);
    let receipt = sqlx::query_as::<_, SaleReceipt>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(receipt)
}

/// Validates and writes a new receipt, then refreshes its invoice.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    input: SaleReceiptInput,
) -> DbResult<SaleReceipt> {
    let input = clean_sale_receipt(input)?;
    let (company, recipient_id) = check_rules(conn, &input, None).await?;

    let now = Utc::now();
    let receipt = SaleReceipt {
        id: Uuid::new_v4().to_string(),
        issue_date: input.issue_date,
        point_of_sale_id: input.point_of_sale_id,
        number: input.number,
        related_invoice_id: input.related_invoice_id,
        sender_id: company.id,
        recipient_id,
        description: input.description,
        total_cents: input.total_cents,
        created_at: now,
        updated_at: now,
    };

    debug!(
        id = %receipt.id,
        number = %receipt.number,
        invoice_id = %receipt.related_invoice_id,
        "Creating sale receipt"
    );

    sqlx::query(
        r#"
        INSERT INTO sale_receipts (
            id, issue_date, point_of_sale_id, number, related_invoice_id,
            sender_id, recipient_id, description, total_cents, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&receipt.id)
    .bind(receipt.issue_date)
    .bind(&receipt.point_of_sale_id)
    .bind(&receipt.number)
    .bind(&receipt.related_invoice_id)
    .bind(&receipt.sender_id)
    .bind(&receipt.recipient_id)
    .bind(&receipt.description)
    .bind(receipt.total_cents)
    .bind(receipt.created_at)
    .bind(receipt.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::on_duplicate(e, "number", receipt.number.clone()))?;

    current_account::record_receipt(
        conn,
        PersonKind::Client,
        &receipt.recipient_id,
        &receipt.id,
        receipt.issue_date,
        receipt.total(),
    )
    .await?;
    sale_invoice::refresh_collected(conn, &receipt.related_invoice_id).await?;

    Ok(receipt)
}

/// Rules shared by create and update. Returns the company and the
/// recipient, which defaults to the invoice's client.
async fn check_rules(
    conn: &mut SqliteConnection,
    input: &SaleReceiptInput,
    exclude_id: Option<&str>,
) -> DbResult<(Company, String)> {
    let company = company::require(conn).await?;

    let current = financial_year::current(conn).await?;
    check_in_current_year(input.issue_date, current.as_ref())?;

    point_of_sale::require_enabled(conn, &input.point_of_sale_id).await?;

    let invoice = sale_invoice::fetch(conn, &input.related_invoice_id)
        .await?
        .ok_or_else(|| DbError::not_found("SaleInvoice", &input.related_invoice_id))?;
    let recipient_id = input
        .recipient_id
        .clone()
        .unwrap_or_else(|| invoice.recipient_id.clone());
    if recipient_id != invoice.recipient_id {
        return Err(CoreError::RecipientMismatch.into());
    }

    let previous = match previous_number(&input.number) {
        Some(number) => issue_date_of(conn, &input.point_of_sale_id, &number, exclude_id).await?,
        None => None,
    };
    let next = match following_number(&input.number) {
        Some(number) => issue_date_of(conn, &input.point_of_sale_id, &number, exclude_id).await?,
        None => None,
    };
    check_date_correlation(DocumentKind::Receipt, input.issue_date, previous, next)?;

    let others = sale_invoice::receipts_total(conn, &invoice.id, exclude_id).await?;
    check_receipt_amount(Money::from_cents(input.total_cents), invoice.total(), others)?;

    Ok((company, recipient_id))
}

async fn issue_date_of(
    conn: &mut SqliteConnection,
    point_of_sale_id: &str,
    number: &str,
    exclude_id: Option<&str>,
) -> DbResult<Option<NaiveDate>> {
    let date: Option<NaiveDate> = sqlx::query_scalar(
        r#"
        SELECT issue_date FROM sale_receipts
        WHERE point_of_sale_id = ?1 AND number = ?2 AND id <> ?3
        "#,
    )
    .bind(point_of_sale_id)
    .bind(number)
    .bind(exclude_id.unwrap_or(""))
    .fetch_optional(&mut *conn)
    .await?;
    Ok(date)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, ledger, person_input, Ledger};

    fn receipt(ledger: &Ledger, invoice_id: &str, number: &str, cents: i64) -> SaleReceiptInput {
        SaleReceiptInput {
            issue_date: date(2024, 2, 10),
            point_of_sale_id: ledger.pos_id.clone(),
            number: number.to_string(),
            related_invoice_id: invoice_id.to_string(),
            recipient_id: None,
            description: "Payment".to_string(),
            total_cents: cents,
        }
    }

    async fn collected(ledger: &Ledger, invoice_id: &str) -> bool {
        ledger
            .db
            .sale_invoices()
            .get(invoice_id)
            .await
            .unwrap()
            .unwrap()
            .collected
    }

    #[tokio::test]
    async fn test_collected_flag_lifecycle() {
        let ledger = ledger().await;
        let db = &ledger.db;
        let invoice = db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 130_001))
            .await
            .unwrap();

        db.sale_receipts()
            .create(receipt(&ledger, &invoice.id, "1", 100_000))
            .await
            .unwrap();
        assert!(!collected(&ledger, &invoice.id).await);

        let second = db
            .sale_receipts()
            .create(receipt(&ledger, &invoice.id, "2", 30_001))
            .await
            .unwrap();
        assert!(collected(&ledger, &invoice.id).await);

        let err = db
            .sale_receipts()
            .create(receipt(&ledger, &invoice.id, "3", 1))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The sum of your receipts cannot be higher than invoice total amount."
        );

        db.sale_receipts().delete(&second.id).await.unwrap();
        assert!(!collected(&ledger, &invoice.id).await);

        let row = db.sale_invoices().row(&invoice.id).await.unwrap().unwrap();
        assert_eq!(row.collected_cents, 100_000);
    }

    #[tokio::test]
    async fn test_receipt_larger_than_invoice() {
        let ledger = ledger().await;
        let invoice = ledger
            .db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 1000))
            .await
            .unwrap();
        let err = ledger
            .db
            .sale_receipts()
            .create(receipt(&ledger, &invoice.id, "1", 1001))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Receipt total amount cannot be higher than invoice total amount."
        );
    }

    #[tokio::test]
    async fn test_huge_receipt_is_rejected() {
        let ledger = ledger().await;
        let invoice = ledger
            .db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 1000))
            .await
            .unwrap();
        let err = ledger
            .db
            .sale_receipts()
            .create(receipt(&ledger, &invoice.id, "1", i64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Validation(_))));
        assert_eq!(err.to_string(), "total_amount must have at most 13 digits before the decimal point");
    }

    #[tokio::test]
    async fn test_moving_receipt_refreshes_both_invoices() {
        let ledger = ledger().await;
        let db = &ledger.db;
        let a = db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 500))
            .await
            .unwrap();
        let b = db
            .sale_invoices()
            .create(ledger.invoice("2", date(2024, 2, 1), 500))
            .await
            .unwrap();

        let moved = db
            .sale_receipts()
            .create(receipt(&ledger, &a.id, "1", 500))
            .await
            .unwrap();
        assert!(collected(&ledger, &a.id).await);

        db.sale_receipts()
            .update(&moved.id, receipt(&ledger, &b.id, "1", 500))
            .await
            .unwrap();
        assert!(!collected(&ledger, &a.id).await);
        assert!(collected(&ledger, &b.id).await);
    }

    #[tokio::test]
    async fn test_editing_receipt_excludes_itself_from_sum() {
        let ledger = ledger().await;
        let db = &ledger.db;
        let invoice = db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 1000))
            .await
            .unwrap();
        let created = db
            .sale_receipts()
            .create(receipt(&ledger, &invoice.id, "1", 900))
            .await
            .unwrap();

        let updated = db
            .sale_receipts()
            .update(&created.id, receipt(&ledger, &invoice.id, "1", 1000))
            .await
            .unwrap();
        assert_eq!(updated.total_cents, 1000);
        assert!(collected(&ledger, &invoice.id).await);
    }

    #[tokio::test]
    async fn test_recipient_must_match_invoice() {
        let ledger = ledger().await;
        let db = &ledger.db;
        let other = db
            .clients()
            .create(person_input("20555555556", "Other"))
            .await
            .unwrap();
        let invoice = db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 1000))
            .await
            .unwrap();

        let mut input = receipt(&ledger, &invoice.id, "1", 100);
        input.recipient_id = Some(other.id);
        assert!(matches!(
            db.sale_receipts().create(input).await,
            Err(DbError::Rejected(CoreError::RecipientMismatch))
        ));

        let created = db
            .sale_receipts()
            .create(receipt(&ledger, &invoice.id, "1", 100))
            .await
            .unwrap();
        assert_eq!(created.recipient_id, ledger.client_id);
    }

    #[tokio::test]
    async fn test_receipt_numbering_and_listing() {
        let ledger = ledger().await;
        let db = &ledger.db;
        let invoice = db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 1000))
            .await
            .unwrap();

        db.sale_receipts()
            .create(receipt(&ledger, &invoice.id, "5", 100))
            .await
            .unwrap();
        let mut early = receipt(&ledger, &invoice.id, "6", 100);
        early.issue_date = date(2024, 2, 9);
        assert_eq!(
            db.sale_receipts().create(early).await.unwrap_err().to_string(),
            "Issue date can't be older than previous receipt."
        );

        assert_eq!(
            db.sale_receipts().next_number(&ledger.pos_id).await.unwrap(),
            "00000006"
        );

        let rows = db
            .sale_receipts()
            .list(&SaleReceiptFilter {
                related_invoice: Some("FA 00001-00000001".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "00001-00000005");
        assert_eq!(rows[0].invoice_label, "FA 00001-00000001");
    }
}
