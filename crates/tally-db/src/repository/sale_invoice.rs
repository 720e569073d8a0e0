//! # Sale Invoice Repository
//!
//! Sale invoices, their lines, and the rules checked before every write.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create / update (one transaction)                   │
//! │                                                                         │
//! │  clean_sale_invoice ── number zero-filled, lines described             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  issue date in current financial year                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  point of sale enabled, references exist                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  n-1 of (type, pos) issued later?  ──► "Issue date can't be older      │
//! │  n+1 of (type, pos) issued earlier?      than previous invoice."       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  update only: new total >= receipts already applied                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write invoice + lines ─► client account entry ─► collected flag       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::calendar::check_in_current_year;
use tally_core::collection::{check_invoice_covers_receipts, is_collected};
use tally_core::numbering::{
    check_date_correlation, following_number, next_in_series, previous_number, DocumentKind,
};
use tally_core::validation::clean_sale_invoice;
use tally_core::{
    lines_total, CollectedFilter, Company, CoreError, Money, PersonKind, SaleInvoice,
    SaleInvoiceFilter, SaleInvoiceInput, SaleInvoiceRow,
};

use crate::error::{DbError, DbResult};
use crate::repository::{
    company, current_account, financial_year, lines, person, point_of_sale, require_exists,
};

const INVOICE_COLUMNS: &str = r#"
    id, issue_date, doc_type_id, point_of_sale_id, number, sender_id,
    recipient_id, payment_method_id, payment_term_id, collected,
    created_at, updated_at
"#;

/// Listing row: label, client and amounts computed in SQL.
pub(crate) const ROW_SELECT: &str = r#"
    SELECT
        si.id,
        si.issue_date,
        dt.doc_type || ' ' || p.pos_number || '-' || si.number AS label,
        si.doc_type_id,
        si.point_of_sale_id,
        si.number,
        si.recipient_id,
        c.name AS client_name,
        c.tax_number AS client_tax_number,
        COALESCE((SELECT SUM(l.total_cents) FROM sale_invoice_lines l
                  WHERE l.invoice_id = si.id), 0) AS total_cents,
        COALESCE((SELECT SUM(r.total_cents) FROM sale_receipts r
                  WHERE r.related_invoice_id = si.id), 0) AS collected_cents,
        si.collected
    FROM sale_invoices si
    JOIN document_types dt ON dt.id = si.doc_type_id
    JOIN points_of_sale p ON p.id = si.point_of_sale_id
    JOIN clients c ON c.id = si.recipient_id
"#;

/// Newest first, then type, point of sale and number descending.
pub(crate) const ROW_ORDER: &str =
    " ORDER BY si.issue_date DESC, dt.doc_type, p.pos_number, si.number DESC";

/// Repository for sale invoice database operations.
#[derive(Debug, Clone)]
pub struct SaleInvoiceRepository {
    pool: SqlitePool,
}

impl SaleInvoiceRepository {
    /// Creates a new SaleInvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleInvoiceRepository { pool }
    }

    /// Searches invoices.
    ///
    /// ## Filters
    /// - `collected`: all, uncollected or collected
    /// - exact: type, point of sale, year, month, `exclude_id`
    /// - partial: number, client name; prefix: client tax number
    pub async fn list(&self, filter: &SaleInvoiceFilter) -> DbResult<Vec<SaleInvoiceRow>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(ROW_SELECT);
        query.push(" WHERE 1 = 1");

        match filter.collected {
            CollectedFilter::All => {}
            CollectedFilter::Uncollected => {
                query.push(" AND si.collected = 0");
            }
            CollectedFilter::Collected => {
                query.push(" AND si.collected = 1");
            }
        }
        if let Some(doc_type_id) = &filter.doc_type_id {
            query.push(" AND si.doc_type_id = ").push_bind(doc_type_id.clone());
        }
        if let Some(point_of_sale_id) = &filter.point_of_sale_id {
            query
                .push(" AND si.point_of_sale_id = ")
                .push_bind(point_of_sale_id.clone());
        }
        if let Some(number) = &filter.number {
            query
                .push(" AND si.number LIKE ")
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
                .push(" AND strftime('%Y', si.issue_date) = ")
                .push_bind(format!("{:04}", year));
        }
        if let Some(month) = filter.month {
            query
                .push(" AND strftime('%m', si.issue_date) = ")
                .push_bind(format!("{:02}", month));
        }
        if let Some(exclude_id) = &filter.exclude_id {
            query.push(" AND si.id <> ").push_bind(exclude_id.clone());
        }
        query.push(ROW_ORDER);

        let rows = query
            .build_query_as::<SaleInvoiceRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Listing row of one invoice.
    pub async fn row(&self, id: &str) -> DbResult<Option<SaleInvoiceRow>> {
        let sql = format!("{} WHERE si.id = ?1", ROW_SELECT);
        let row = sqlx::query_as::<_, SaleInvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Gets an invoice with its lines.
    pub async fn get(&self, id: &str) -> DbResult<Option<SaleInvoice>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Number the next invoice of `(type, point of sale)` should take.
    pub async fn next_number(&self, doc_type_id: &str, point_of_sale_id: &str) -> DbResult<String> {
        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT MAX(number) FROM sale_invoices
            WHERE doc_type_id = ?1 AND point_of_sale_id = ?2
            "#,
        )
        .bind(doc_type_id)
        .bind(point_of_sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(next_in_series(last.as_deref()))
    }

    pub async fn create(&self, input: SaleInvoiceInput) -> DbResult<SaleInvoice> {
        let mut tx = self.pool.begin().await?;
        let invoice = insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(invoice)
    }

    /// Updates an invoice, replacing its lines.
    ///
    /// The new total may not fall below the receipts already applied, and
    /// an invoice with receipts keeps its client.
    pub async fn update(&self, id: &str, input: SaleInvoiceInput) -> DbResult<SaleInvoice> {
        let input = clean_sale_invoice(input)?;
        let mut tx = self.pool.begin().await?;

        let existing = fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("SaleInvoice", id))?;
        check_rules(&mut tx, &input, Some(id)).await?;

        let receipts = receipts_total(&mut tx, id, None).await?;
        check_invoice_covers_receipts(lines_total(&input.lines)?, receipts)?;
        if !receipts.is_zero() && existing.recipient_id != input.recipient_id {
            return Err(CoreError::RecipientMismatch.into());
        }

        debug!(id = %id, number = %input.number, "Updating sale invoice");

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE sale_invoices SET
                issue_date = ?1, doc_type_id = ?2, point_of_sale_id = ?3, number = ?4,
                recipient_id = ?5, payment_method_id = ?6, payment_term_id = ?7,
                updated_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(input.issue_date)
        .bind(&input.doc_type_id)
        .bind(&input.point_of_sale_id)
        .bind(&input.number)
        .bind(&input.recipient_id)
        .bind(&input.payment_method_id)
        .bind(&input.payment_term_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_duplicate(e, "number", input.number.clone()))?;

        let written = lines::replace(&mut tx, lines::SALE_LINES, id, &input.lines).await?;
        let total: Money = written.iter().map(|l| Money::from_cents(l.total_cents)).sum();
        current_account::record_invoice(
            &mut tx,
            PersonKind::Client,
            &input.recipient_id,
            id,
            input.issue_date,
            total,
        )
        .await?;
        let collected = refresh_collected(&mut tx, id).await?;

        tx.commit().await?;
        Ok(SaleInvoice {
            issue_date: input.issue_date,
            doc_type_id: input.doc_type_id,
            point_of_sale_id: input.point_of_sale_id,
            number: input.number,
            recipient_id: input.recipient_id,
            payment_method_id: input.payment_method_id,
            payment_term_id: input.payment_term_id,
            collected,
            updated_at: now,
            lines: written,
            ..existing
        })
    }

    /// Deletes an invoice without receipts. Lines and the account entry go
    /// with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("SaleInvoice", id))?;

        let receipts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_receipts WHERE related_invoice_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if receipts > 0 {
            warn!(id = %id, receipts, "Refusing to delete invoice with receipts");
            return Err(DbError::restricted(
                "SaleInvoice",
                "The invoice you're trying to delete has related receipts.",
            ));
        }

        sqlx::query("DELETE FROM sale_invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id = %id, "Deleted sale invoice");
        Ok(())
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SaleInvoice>> {
    let sql = format!("SELECT {} FROM sale_invoices WHERE id = ?1", INVOICE_COLUMNS);
    let invoice = sqlx::query_as::<_, SaleInvoice>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match invoice {
        Some(mut invoice) => {
            invoice.lines = lines::fetch(conn, lines::SALE_LINES, id).await?;
            Ok(Some(invoice))
        }
        None => Ok(None),
    }
}

/// Invoice by business key: type, point of sale and number.
pub(crate) async fn by_key(
    conn: &mut SqliteConnection,
    doc_type_id: &str,
    point_of_sale_id: &str,
    number: &str,
) -> DbResult<Option<SaleInvoice>> {
    let sql = format!(
        r#"
        SELECT {} FROM sale_invoices
        WHERE doc_type_id = ?1 AND point_of_sale_id = ?2 AND number = ?3
        "#,
        INVOICE_COLUMNS
    );
    let invoice = sqlx::query_as::<_, SaleInvoice>(&sql)
        .bind(doc_type_id)
        .bind(point_of_sale_id)
        .bind(number)
        .fetch_optional(&mut *conn)
        .await?;

    match invoice {
        Some(mut invoice) => {
            invoice.lines = lines::fetch(conn, lines::SALE_LINES, &invoice.id).await?;
            Ok(Some(invoice))
        }
        None => Ok(None),
    }
}

/// Validates and writes a new invoice with its lines and account entry.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    input: SaleInvoiceInput,
) -> DbResult<SaleInvoice> {
    let input = clean_sale_invoice(input)?;
    let company = check_rules(conn, &input, None).await?;

    let now = Utc::now();
    let id = Uuid::new_v4().to_string();

    debug!(id = %id, number = %input.number, "Creating sale invoice");

    sqlx::query(
        r#"
        INSERT INTO sale_invoices (
            id, issue_date, doc_type_id, point_of_sale_id, number, sender_id,
            recipient_id, payment_method_id, payment_term_id, collected,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?11)
        "#,
    )
    .bind(&id)
    .bind(input.issue_date)
    .bind(&input.doc_type_id)
    .bind(&input.point_of_sale_id)
    .bind(&input.number)
    .bind(&company.id)
    .bind(&input.recipient_id)
    .bind(&input.payment_method_id)
    .bind(&input.payment_term_id)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::on_duplicate(e, "number", input.number.clone()))?;

    let written = lines::replace(conn, lines::SALE_LINES, &id, &input.lines).await?;
    let total: Money = written.iter().map(|l| Money::from_cents(l.total_cents)).sum();
    current_account::record_invoice(
        conn,
        PersonKind::Client,
        &input.recipient_id,
        &id,
        input.issue_date,
        total,
    )
    .await?;
    let collected = refresh_collected(conn, &id).await?;

    Ok(SaleInvoice {
        id,
        issue_date: input.issue_date,
        doc_type_id: input.doc_type_id,
        point_of_sale_id: input.point_of_sale_id,
        number: input.number,
        sender_id: company.id,
        recipient_id: input.recipient_id,
        payment_method_id: input.payment_method_id,
        payment_term_id: input.payment_term_id,
        collected,
        created_at: now,
        updated_at: now,
        lines: written,
    })
}

/// Rules shared by create and update. `exclude_id` is the invoice being
/// edited, left out of the neighbour lookups.
async fn check_rules(
    conn: &mut SqliteConnection,
    input: &SaleInvoiceInput,
    exclude_id: Option<&str>,
) -> DbResult<Company> {
    let company = company::require(conn).await?;

    let current = financial_year::current(conn).await?;
    check_in_current_year(input.issue_date, current.as_ref())?;

    point_of_sale::require_enabled(conn, &input.point_of_sale_id).await?;
    require_exists(conn, "document_types", "DocumentType", &input.doc_type_id).await?;
    person::fetch(conn, PersonKind::Client, &input.recipient_id)
        .await?
        .ok_or_else(|| DbError::not_found("Client", &input.recipient_id))?;
    require_exists(conn, "payment_methods", "PaymentMethod", &input.payment_method_id).await?;
    require_exists(conn, "payment_terms", "PaymentTerm", &input.payment_term_id).await?;

    let previous = match previous_number(&input.number) {
        Some(number) => issue_date_of(conn, input, &number, exclude_id).await?,
        None => None,
    };
    let next = match following_number(&input.number) {
        Some(number) => issue_date_of(conn, input, &number, exclude_id).await?,
        None => None,
    };
    check_date_correlation(DocumentKind::Invoice, input.issue_date, previous, next)?;

    Ok(company)
}

/// Issue date of invoice `number` in the same series as `input`.
async fn issue_date_of(
    conn: &mut SqliteConnection,
    input: &SaleInvoiceInput,
    number: &str,
    exclude_id: Option<&str>,
) -> DbResult<Option<NaiveDate>> {
    let date: Option<NaiveDate> = sqlx::query_scalar(
        r#"
        SELECT issue_date FROM sale_invoices
        WHERE doc_type_id = ?1 AND point_of_sale_id = ?2 AND number = ?3
          AND id <> ?4
        "#,
    )
    .bind(&input.doc_type_id)
    .bind(&input.point_of_sale_id)
    .bind(number)
    .bind(exclude_id.unwrap_or(""))
    .fetch_optional(&mut *conn)
    .await?;
    Ok(date)
}

/// Sum of the receipts of an invoice, optionally leaving one out.
pub(crate) async fn receipts_total(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    exclude_receipt: Option<&str>,
) -> DbResult<Money> {
    let cents: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_cents), 0) FROM sale_receipts
        WHERE related_invoice_id = ?1 AND id <> ?2
        "#,
    )
    .bind(invoice_id)
    .bind(exclude_receipt.unwrap_or(""))
    .fetch_one(&mut *conn)
    .await?;
    Ok(Money::from_cents(cents))
}

/// Recomputes and stores the collected flag. Returns the new value.
pub(crate) async fn refresh_collected(conn: &mut SqliteConnection, invoice_id: &str) -> DbResult<bool> {
    let total = lines::total(conn, lines::SALE_LINES, invoice_id).await?;
    let receipts = receipts_total(conn, invoice_id, None).await?;
    let collected = is_collected(total, receipts);

    debug!(
        invoice_id = %invoice_id,
        total = %total,
        receipts = %receipts,
        collected,
        "Refreshing collected flag"
    );

    sqlx::query("UPDATE sale_invoices SET collected = ?1 WHERE id = ?2")
        .bind(collected)
        .bind(invoice_id)
        .execute(&mut *conn)
        .await?;
    Ok(collected)
}

// =============================================================================
// Unit Tests
// =============================================================================
