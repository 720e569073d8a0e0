//! # Payment Conditions Repository
//!
//! Payment methods (`Cash`, `Transfer`, ...) and payment terms (`30 days`).
//! Both can be created in batches; a batch is written whole or not at all.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use tally_core::validation::{clean_payment_method, clean_payment_term};
use tally_core::{PaymentMethod, PaymentMethodInput, PaymentTerm, PaymentTermInput};

use crate::error::{DbError, DbResult};

/// Repository for payment methods and terms.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    // =========================================================================
    // Methods
    // =========================================================================

    pub async fn list_methods(&self) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name FROM payment_methods ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(methods)
    }

    pub async fn get_method(&self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name FROM payment_methods WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(method)
    }

    /// Creates every method of the batch. Names are unique ignoring case.
    pub async fn create_methods(
        &self,
        inputs: Vec<PaymentMethodInput>,
    ) -> DbResult<Vec<PaymentMethod>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            let input = clean_payment_method(input)?;
            let method = PaymentMethod {
                id: Uuid::new_v4().to_string(),
                name: input.name,
            };
            debug!(id = %method.id, name = %method.name, "Creating payment method");

            sqlx::query("INSERT INTO payment_methods (id, name) VALUES (?1, ?2)")
                .bind(&method.id)
                .bind(&method.name)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::on_duplicate(e, "name", method.name.clone()))?;
            created.push(method);
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn update_method(
        &self,
        id: &str,
        input: PaymentMethodInput,
    ) -> DbResult<PaymentMethod> {
        let input = clean_payment_method(input)?;
        debug!(id = %id, name = %input.name, "Updating payment method");

        let result = sqlx::query("UPDATE payment_methods SET name = ?1 WHERE id = ?2")
            .bind(&input.name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_duplicate(e, "name", input.name.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", id));
        }
        Ok(PaymentMethod {
            id: id.to_string(),
            name: input.name,
        })
    }

    pub async fn delete_method(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting payment method");

        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DbError::on_restrict(
                    e,
                    "PaymentMethod",
                    "The payment method you're trying to delete is used by documents.",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", id));
        }
        Ok(())
    }

    // =========================================================================
    // Terms
    // =========================================================================

    pub async fn list_terms(&self) -> DbResult<Vec<PaymentTerm>> {
        let terms =
            sqlx::query_as::<_, PaymentTerm>("SELECT id, days FROM payment_terms ORDER BY days")
                .fetch_all(&self.pool)
                .await?;
        Ok(terms)
    }

    pub async fn get_term(&self, id: &str) -> DbResult<Option<PaymentTerm>> {
        let term =
            sqlx::query_as::<_, PaymentTerm>("SELECT id, days FROM payment_terms WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(term)
    }

    /// Creates every term of the batch.
    pub async fn create_terms(&self, inputs: Vec<PaymentTermInput>) -> DbResult<Vec<PaymentTerm>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            let term = PaymentTerm {
                id: Uuid::new_v4().to_string(),
                days: clean_payment_term(&input)?,
            };
            debug!(id = %term.id, days = term.days, "Creating payment term");

            sqlx::query("INSERT INTO payment_terms (id, days) VALUES (?1, ?2)")
                .bind(&term.id)
                .bind(term.days)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::on_duplicate(e, "days", term.days.to_string()))?;
            created.push(term);
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn update_term(&self, id: &str, input: PaymentTermInput) -> DbResult<PaymentTerm> {
        let days = clean_payment_term(&input)?;
        debug!(id = %id, days, "Updating payment term");

        let result = sqlx::query("UPDATE payment_terms SET days = ?1 WHERE id = ?2")
            .bind(days)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_duplicate(e, "days", days.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentTerm", id));
        }
        Ok(PaymentTerm {
            id: id.to_string(),
            days,
        })
    }

    pub async fn delete_term(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting payment term");

        let result = sqlx::query("DELETE FROM payment_terms WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DbError::on_restrict(
                    e,
                    "PaymentTerm",
                    "The payment term you're trying to delete is used by documents.",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentTerm", id));
        }
        Ok(())
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

/// Method by name, ignoring case (the column collates NOCASE).
pub(crate) async fn method_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<PaymentMethod>> {
    let method = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name FROM payment_methods WHERE name = ?1",
    )
    .bind(name.trim())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(method)
}

pub(crate) async fn term_by_days(
    conn: &mut SqliteConnection,
    days: i64,
) -> DbResult<Option<PaymentTerm>> {
    let term = sqlx::query_as::<_, PaymentTerm>("SELECT id, days FROM payment_terms WHERE days = ?1")
        .bind(days)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(term)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, ledger};
    use crate::{Database, DbConfig};

    fn method(name: &str) -> PaymentMethodInput {
        PaymentMethodInput {
            name: name.to_string(),
        }
    }

    fn term(days: &str) -> PaymentTermInput {
        PaymentTermInput {
            days: days.to_string(),
        }
    }

    #[tokio::test]
    async fn test_method_names_ignore_case() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payment_conditions();

        let created = repo
            .create_methods(vec![method("Cash"), method("Transfer")])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);

        let err = repo.create_methods(vec![method("CASH")]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let mut conn = db.pool().acquire().await.unwrap();
        let found = method_by_name(&mut conn, "transfer").await.unwrap();
        assert_eq!(found.map(|m| m.name), Some("Transfer".to_string()));
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payment_conditions();

        assert!(repo
            .create_terms(vec![term("30"), term("thirty")])
            .await
            .is_err());
        assert!(repo.list_terms().await.unwrap().is_empty());

        let terms = repo.create_terms(vec![term("60"), term("30")]).await.unwrap();
        assert_eq!(terms[0].to_string(), "60 days");
        let listed: Vec<i64> = repo.list_terms().await.unwrap().iter().map(|t| t.days).collect();
        assert_eq!(listed, vec![30, 60]);
    }

    #[tokio::test]
    async fn test_delete_used_method() {
        let ledger = ledger().await;
        let db = &ledger.db;
        db.sale_invoices()
            .create(ledger.invoice("1", date(2024, 1, 5), 500))
            .await
            .unwrap();

        assert!(matches!(
            db.payment_conditions().delete_method(&ledger.method_id).await,
            Err(DbError::Restricted { .. })
        ));

        let unused = db
            .payment_conditions()
            .create_methods(vec![method("Cheque")])
            .await
            .unwrap();
        db.payment_conditions()
            .delete_method(&unused[0].id)
            .await
            .unwrap();
    }
}
