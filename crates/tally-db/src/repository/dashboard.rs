//! Figures for the landing screen, read in one connection.

use sqlx::{SqliteConnection, SqlitePool};

use tally_core::{Dashboard, PersonKind, SaleInvoiceRow, SaleReceiptRow};

use crate::error::DbResult;
use crate::repository::{current_account, financial_year, sale_invoice, sale_receipt};

/// Repository for the dashboard summary.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    pub async fn summary(&self) -> DbResult<Dashboard> {
        let mut conn = self.pool.acquire().await?;

        let to_collect = current_account::total_balance(&mut conn, PersonKind::Client).await?;

        let last_invoice = invoice_row(&mut conn, sale_invoice::ROW_ORDER).await?;
        let oldest_pending_invoice = invoice_row(
            &mut conn,
            " WHERE si.collected = 0 ORDER BY si.issue_date, p.pos_number, si.number",
        )
        .await?;
        let last_receipt = receipt_row(&mut conn, sale_receipt::ROW_ORDER).await?;
        let highest_receipt = receipt_row(
            &mut conn,
            " ORDER BY sr.total_cents DESC, sr.issue_date DESC",
        )
        .await?;

        let current_year = financial_year::current(&mut conn).await?;

        Ok(Dashboard {
            amount_to_collect_cents: to_collect.cents(),
            last_invoice,
            last_receipt,
            oldest_pending_invoice,
            highest_receipt,
            current_year,
        })
    }
}

async fn invoice_row(conn: &mut SqliteConnection, tail: &str) -> DbResult<Option<SaleInvoiceRow>> {
    let sql = format!("{}{} LIMIT 1", sale_invoice::ROW_SELECT, tail);
    let row = sqlx::query_as::<_, SaleInvoiceRow>(&sql)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

async fn receipt_row(conn: &mut SqliteConnection, tail: &str) -> DbResult<Option<SaleReceiptRow>> {
    let sql = format!("{}{} LIMIT 1", sale_receipt::ROW_SELECT, tail);
    let row = sqlx::query_as::<_, SaleReceiptRow>(&sql)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}
