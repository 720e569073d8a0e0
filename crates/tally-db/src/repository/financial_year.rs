//! # Financial Year Repository
//!
//! At most one year is current; every commercial document is checked
//! against it.
//!
//! ## Current Flag
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create 2023            (first year)   → 2023 current                   │
//! │  create 2024                           → 2023 current, 2024 not        │
//! │  update 2024 current=1  (one tx)                                       │
//! │      UPDATE financial_years SET current = 0                            │
//! │      UPDATE financial_years SET current = 1 WHERE id = 2024            │
//! │                                        → 2024 current, 2023 not        │
//! │                                                                         │
//! │  idx_financial_years_current: UNIQUE (current) WHERE current = 1       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::calendar::check_year_not_before_creation;
use tally_core::validation::clean_financial_year;
use tally_core::{FinancialYear, FinancialYearInput};

use crate::error::{DbError, DbResult};
use crate::repository::company;

/// Repository for financial years.
#[derive(Debug, Clone)]
pub struct FinancialYearRepository {
    pool: SqlitePool,
}

impl FinancialYearRepository {
    /// Creates a new FinancialYearRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FinancialYearRepository { pool }
    }

    /// Lists every year, newest first.
    pub async fn list(&self) -> DbResult<Vec<FinancialYear>> {
        let years = sqlx::query_as::<_, FinancialYear>(
            "SELECT id, year, current FROM financial_years ORDER BY year DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(years)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<FinancialYear>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// The year flagged as current.
    pub async fn current(&self) -> DbResult<Option<FinancialYear>> {
        let mut conn = self.pool.acquire().await?;
        current(&mut conn).await
    }

    /// Creates a year. The first year ever created becomes current.
    pub async fn create(&self, input: FinancialYearInput) -> DbResult<FinancialYear> {
        let input = clean_financial_year(input)?;
        let mut tx = self.pool.begin().await?;

        check_creation(&mut tx, &input.year).await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financial_years")
            .fetch_one(&mut *tx)
            .await?;

        let year = FinancialYear {
            id: Uuid::new_v4().to_string(),
            year: input.year,
            current: input.current || existing == 0,
        };

        if year.current {
            clear_current(&mut tx).await?;
        }

        info!(id = %year.id, year = %year.year, current = year.current, "Creating financial year");

        sqlx::query("INSERT INTO financial_years (id, year, current) VALUES (?1, ?2, ?3)")
            .bind(&year.id)
            .bind(&year.year)
            .bind(year.current)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::on_duplicate(e, "year", year.year.clone()))?;

        tx.commit().await?;
        Ok(year)
    }

    /// Updates a year. Flagging it current clears every other year.
    pub async fn update(&self, id: &str, input: FinancialYearInput) -> DbResult<FinancialYear> {
        let input = clean_financial_year(input)?;
        let mut tx = self.pool.begin().await?;

        fetch(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("FinancialYear", id))?;
        check_creation(&mut tx, &input.year).await?;

        if input.current {
            clear_current(&mut tx).await?;
        }

        debug!(id = %id, year = %input.year, current = input.current, "Updating financial year");

        sqlx::query("UPDATE financial_years SET year = ?1, current = ?2 WHERE id = ?3")
            .bind(&input.year)
            .bind(input.current)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::on_duplicate(e, "year", input.year.clone()))?;

        tx.commit().await?;
        Ok(FinancialYear {
            id: id.to_string(),
            year: input.year,
            current: input.current,
        })
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting financial year");

        let result = sqlx::query("DELETE FROM financial_years WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("FinancialYear", id));
        }
        Ok(())
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<FinancialYear>> {
    let year = sqlx::query_as::<_, FinancialYear>(
        "SELECT id, year, current FROM financial_years WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(year)
}

/// The year flagged as current, if any.
pub(crate) async fn current(conn: &mut SqliteConnection) -> DbResult<Option<FinancialYear>> {
    let year = sqlx::query_as::<_, FinancialYear>(
        "SELECT id, year, current FROM financial_years WHERE current = 1",
    )
    .fetch_optional(&mut *conn)
    .await?;
    Ok(year)
}

async fn clear_current(conn: &mut SqliteConnection) -> DbResult<()> {
    sqlx::query("UPDATE financial_years SET current = 0 WHERE current = 1")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// A year may not predate the company.
async fn check_creation(conn: &mut SqliteConnection, year: &str) -> DbResult<()> {
    let company = company::require(conn).await?;
    let year: i32 = year.parse().unwrap_or_default();
    check_year_not_before_creation(year, company.creation_date)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::company_input;
    use crate::{Database, DbConfig};
    use tally_core::CoreError;

    fn year(value: &str, current: bool) -> FinancialYearInput {
        FinancialYearInput {
            year: value.to_string(),
            current,
        }
    }

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.company().save(company_input()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_first_year_becomes_current() {
        let db = setup().await;
        let first = db.years().create(year("2023", false)).await.unwrap();
        assert!(first.current);

        let second = db.years().create(year("2024", false)).await.unwrap();
        assert!(!second.current);
        assert_eq!(db.years().current().await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_single_current_year() {
        let db = setup().await;
        let first = db.years().create(year("2023", false)).await.unwrap();
        let second = db.years().create(year("2024", false)).await.unwrap();

        db.years().update(&second.id, year("2024", true)).await.unwrap();

        let years = db.years().list().await.unwrap();
        let current: Vec<&str> = years
            .iter()
            .filter(|y| y.current)
            .map(|y| y.id.as_str())
            .collect();
        assert_eq!(current, vec![second.id.as_str()]);
        assert!(!db.years().get(&first.id).await.unwrap().unwrap().current);
    }

    #[tokio::test]
    async fn test_year_rules() {
        let db = setup().await;
        assert!(matches!(
            db.years().create(year("2019", false)).await,
            Err(DbError::Rejected(CoreError::YearBeforeCreation { .. }))
        ));

        db.years().create(year("2021", false)).await.unwrap();
        assert!(matches!(
            db.years().create(year("2021", false)).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_year() {
        let db = setup().await;
        let created = db.years().create(year("2022", false)).await.unwrap();
        db.years().delete(&created.id).await.unwrap();
        assert!(matches!(
            db.years().delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
