//! Invoice lines, shared by sale and purchase invoices. Lines are replaced
//! as a whole on every write and their total is always recomputed.

use sqlx::SqliteConnection;
use uuid::Uuid;

use tally_core::{InvoiceLine, InvoiceLineInput, Money};

use crate::error::DbResult;

pub(crate) const SALE_LINES: &str = "sale_invoice_lines";
pub(crate) const PURCHASE_LINES: &str = "purchase_invoice_lines";

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    table: &str,
    invoice_id: &str,
) -> DbResult<Vec<InvoiceLine>> {
    let sql = format!(
        r#"
        SELECT id, invoice_id, position, description,
               taxable_cents, not_taxable_cents, vat_cents, total_cents
        FROM {}
        WHERE invoice_id = ?1
        ORDER BY position
        "#,
        table
    );
    let lines = sqlx::query_as::<_, InvoiceLine>(&sql)
        .bind(invoice_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(lines)
}

/// Stored total of an invoice.
pub(crate) async fn total(
    conn: &mut SqliteConnection,
    table: &str,
    invoice_id: &str,
) -> DbResult<Money> {
    let sql = format!(
        "SELECT COALESCE(SUM(total_cents), 0) FROM {} WHERE invoice_id = ?1",
        table
    );
    let cents: i64 = sqlx::query_scalar(&sql)
        .bind(invoice_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(Money::from_cents(cents))
}

/// Deletes the current lines of the invoice and writes `inputs` in order.
pub(crate) async fn replace(
    conn: &mut SqliteConnection,
    table: &str,
    invoice_id: &str,
    inputs: &[InvoiceLineInput],
) -> DbResult<Vec<InvoiceLine>> {
    let delete = format!("DELETE FROM {} WHERE invoice_id = ?1", table);
    sqlx::query(&delete)
        .bind(invoice_id)
        .execute(&mut *conn)
        .await?;

    let insert = format!(
        r#"
        INSERT INTO {} (
            id, invoice_id, position, description,
            taxable_cents, not_taxable_cents, vat_cents, total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        table
    );

    let mut lines = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let line = InvoiceLine {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            position: index as i64 + 1,
            description: input.description.clone(),
            taxable_cents: input.taxable_cents,
            not_taxable_cents: input.not_taxable_cents,
            vat_cents: input.vat_cents,
            total_cents: input.total()?.cents(),
        };

        sqlx::query(&insert)
            .bind(&line.id)
            .bind(&line.invoice_id)
            .bind(line.position)
            .bind(&line.description)
            .bind(line.taxable_cents)
            .bind(line.not_taxable_cents)
            .bind(line.vat_cents)
            .bind(line.total_cents)
            .execute(&mut *conn)
            .await?;
        lines.push(line);
    }
    Ok(lines)
}
