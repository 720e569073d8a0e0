//! # Current Account Repository
//!
//! One entry per document on the person's current account. Entries are
//! written by the document repositories inside their own transactions and
//! removed by `ON DELETE CASCADE` with the document.
//!
//! ## Entries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client "Acme"                                                          │
//! │                                                                         │
//! │  2020-03-01   opening             0.00                                 │
//! │  2024-02-01   invoice FA 00001-1  +1300.01   (invoice_id)              │
//! │  2024-02-10   receipt 00001-1     -1000.00   (receipt_id)              │
//! │                                   ────────                              │
//! │  balance                            300.01                              │
//! │                                                                         │
//! │  Suppliers mirror this with purchase invoices and receipts.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use tally_core::{AccountEntry, AccountStatement, Money, PersonKind};

use crate::error::{DbError, DbResult};
use crate::repository::person;

/// Repository for current account statements.
#[derive(Debug, Clone)]
pub struct CurrentAccountRepository {
    pool: SqlitePool,
}

impl CurrentAccountRepository {
    /// Creates a new CurrentAccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CurrentAccountRepository { pool }
    }

    /// Entries of one person, oldest first, with the balance.
    pub async fn statement(&self, kind: PersonKind, person_id: &str) -> DbResult<AccountStatement> {
        let mut conn = self.pool.acquire().await?;

        let person = person::fetch(&mut conn, kind, person_id)
            .await?
            .ok_or_else(|| DbError::not_found(kind.to_string(), person_id))?;

        let sql = format!(
            r#"
            SELECT id, person_id, date, amount_cents, invoice_id, receipt_id
            FROM {}
            WHERE person_id = ?1
            ORDER BY date, rowid
            "#,
            entries_table(kind)
        );
        let entries = sqlx::query_as::<_, AccountEntry>(&sql)
            .bind(person_id)
            .fetch_all(&mut *conn)
            .await?;

        let balance: Money = entries.iter().map(|e| e.amount()).sum();

        Ok(AccountStatement {
            person,
            entries,
            balance_cents: balance.cents(),
        })
    }

    /// Sum of every account of the kind.
    pub async fn total_balance(&self, kind: PersonKind) -> DbResult<Money> {
        let mut conn = self.pool.acquire().await?;
        total_balance(&mut conn, kind).await
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) fn entries_table(kind: PersonKind) -> &'static str {
    match kind {
        PersonKind::Client => "client_account_entries",
        PersonKind::Supplier => "supplier_account_entries",
    }
}

pub(crate) async fn total_balance(conn: &mut SqliteConnection, kind: PersonKind) -> DbResult<Money> {
    let sql = format!(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM {}",
        entries_table(kind)
    );
    let cents: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
    Ok(Money::from_cents(cents))
}

/// Zero entry dated on the company's creation date.
pub(crate) async fn open(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    person_id: &str,
    date: NaiveDate,
) -> DbResult<()> {
    insert(conn, kind, person_id, date, Money::zero(), None, None).await
}

/// Replaces the entry of an invoice with its current total.
pub(crate) async fn record_invoice(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    person_id: &str,
    invoice_id: &str,
    date: NaiveDate,
    total: Money,
) -> DbResult<()> {
    let sql = format!("DELETE FROM {} WHERE invoice_id = ?1", entries_table(kind));
    sqlx::query(&sql).bind(invoice_id).execute(&mut *conn).await?;
    insert(conn, kind, person_id, date, total, Some(invoice_id), None).await
}

/// Replaces the entry of a receipt. Receipts reduce the balance.
pub(crate) async fn record_receipt(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    person_id: &str,
    receipt_id: &str,
    date: NaiveDate,
    total: Money,
) -> DbResult<()> {
    let sql = format!("DELETE FROM {} WHERE receipt_id = ?1", entries_table(kind));
    sqlx::query(&sql).bind(receipt_id).execute(&mut *conn).await?;
    insert(conn, kind, person_id, date, -total, None, Some(receipt_id)).await
}

async fn insert(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    person_id: &str,
    date: NaiveDate,
    amount: Money,
    invoice_id: Option<&str>,
    receipt_id: Option<&str>,
) -> DbResult<()> {
    debug!(
        person_id = %person_id,
        amount = %amount,
        kind = %kind,
        "Writing current account entry"
    );

    let sql = format!(
        r#"
        INSERT INTO {} (id, person_id, date, amount_cents, invoice_id, receipt_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        entries_table(kind)
    );
    sqlx::query(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(person_id)
        .bind(date)
        .bind(amount.cents())
        .bind(invoice_id)
        .bind(receipt_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, ledger};
    use tally_core::SaleReceiptInput;

    #[tokio::test]
    async fn test_client_statement_follows_documents() {
        let ledger = ledger().await;
        let db = &ledger.db;

        let opening = db
            .accounts()
            .statement(PersonKind::Client, &ledger.client_id)
            .await
            .unwrap();
        assert_eq!(opening.entries.len(), 1);
        assert_eq!(opening.entries[0].date, date(2020, 3, 1));
        assert_eq!(opening.balance_cents, 0);

        let invoice = db
            .sale_invoices()
            .create(ledger.invoice("1", date(2024, 2, 1), 130_001))
            .await
            .unwrap();
        db.sale_receipts()
            .create(SaleReceiptInput {
                issue_date: date(2024, 2, 10),
                point_of_sale_id: ledger.pos_id.clone(),
                number: "1".to_string(),
                related_invoice_id: invoice.id.clone(),
                recipient_id: None,
                description: "First payment".to_string(),
                total_cents: 100_000,
            })
            .await
            .unwrap();

        let statement = db
            .accounts()
            .statement(PersonKind::Client, &ledger.client_id)
            .await
            .unwrap();
        assert_eq!(statement.entries.len(), 3);
        assert_eq!(statement.balance_cents, 30_001);
        assert_eq!(
            db.accounts()
                .total_balance(PersonKind::Client)
                .await
                .unwrap()
                .cents(),
            30_001
        );

        db.sale_invoices()
            .update(&invoice.id, ledger.invoice("1", date(2024, 2, 1), 150_000))
            .await
            .unwrap();
        let statement = db
            .accounts()
            .statement(PersonKind::Client, &ledger.client_id)
            .await
            .unwrap();
        assert_eq!(statement.entries.len(), 3);
        assert_eq!(statement.balance_cents, 50_000);
    }
}
