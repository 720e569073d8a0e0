//! # Company Repository
//!
//! The singleton company row: the sender of every sale document and the
//! recipient of every purchase document.
//!
//! ## Singleton
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  companies.singleton INTEGER UNIQUE CHECK (singleton = 1)               │
//! │                                                                         │
//! │  create()  no row ─► INSERT                                            │
//! │            row    ─► "An instance of Company already exists"           │
//! │                                                                         │
//! │  save()    no row ─► INSERT                                            │
//! │            row    ─► UPDATE in place (id kept)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::calendar::year_periods;
use tally_core::validation::clean_company;
use tally_core::{Company, CompanyInput, CoreError, YearKind, YearPeriods};

use crate::error::{DbError, DbResult};
use crate::repository::financial_year;

const COMPANY_COLUMNS: &str = r#"
    id, tax_number, name, address, email, phone,
    creation_date, closing_date, created_at, updated_at
"#;

/// Repository for the company settings.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Gets the company, if configured.
    pub async fn get(&self) -> DbResult<Option<Company>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn).await
    }

    /// Creates the company. Fails when one already exists.
    pub async fn create(&self, input: CompanyInput) -> DbResult<Company> {
        let input = clean_company(input)?;
        let mut tx = self.pool.begin().await?;

        if fetch(&mut tx).await?.is_some() {
            return Err(CoreError::CompanyAlreadyExists.into());
        }
        let company = insert(&mut tx, input).await?;

        tx.commit().await?;
        Ok(company)
    }

    /// Creates the company, or updates the existing one.
    pub async fn save(&self, input: CompanyInput) -> DbResult<Company> {
        let input = clean_company(input)?;
        let mut tx = self.pool.begin().await?;

        let company = match fetch(&mut tx).await? {
            None => insert(&mut tx, input).await?,
            Some(existing) => {
                debug!(id = %existing.id, "Updating company");
                let now = Utc::now();
                sqlx::query(
                    r#"
                    UPDATE companies SET
                        tax_number = ?1, name = ?2, address = ?3, email = ?4,
                        phone = ?5, creation_date = ?6, closing_date = ?7,
                        updated_at = ?8
                    WHERE id = ?9
                    "#,
                )
                .bind(&input.tax_number)
                .bind(&input.name)
                .bind(&input.address)
                .bind(&input.email)
                .bind(&input.phone)
                .bind(input.creation_date)
                .bind(input.closing_date)
                .bind(now)
                .bind(&existing.id)
                .execute(&mut *tx)
                .await?;

                Company {
                    tax_number: input.tax_number,
                    name: input.name,
                    address: input.address,
                    email: input.email,
                    phone: input.phone,
                    creation_date: input.creation_date,
                    closing_date: input.closing_date,
                    updated_at: now,
                    ..existing
                }
            }
        };

        tx.commit().await?;
        Ok(company)
    }

    /// Period bounds of `year` (default: the current financial year) and
    /// of the year before.
    pub async fn periods(&self, kind: YearKind, year: Option<i32>) -> DbResult<YearPeriods> {
        let mut conn = self.pool.acquire().await?;
        let company = require(&mut conn).await?;

        let year = match year {
            Some(year) => year,
            None => financial_year::current(&mut conn)
                .await?
                .map(|y| y.year_number())
                .ok_or(CoreError::NoCurrentFinancialYear)?,
        };

        Ok(year_periods(kind, year, company.closing_date))
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection) -> DbResult<Option<Company>> {
    let sql = format!("SELECT {} FROM companies LIMIT 1", COMPANY_COLUMNS);
    let company = sqlx::query_as::<_, Company>(&sql)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(company)
}

/// The company, or "The company settings have not been configured yet."
pub(crate) async fn require(conn: &mut SqliteConnection) -> DbResult<Company> {
    fetch(conn)
        .await?
        .ok_or(DbError::Rejected(CoreError::CompanyNotConfigured))
}

async fn insert(conn: &mut SqliteConnection, input: CompanyInput) -> DbResult<Company> {
    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4().to_string(),
        tax_number: input.tax_number,
        name: input.name,
        address: input.address,
        email: input.email,
        phone: input.phone,
        creation_date: input.creation_date,
        closing_date: input.closing_date,
        created_at: now,
        updated_at: now,
    };

    info!(
        id = %company.id,
        creation_year = company.creation_date.year(),
        "Creating company"
    );

    sqlx::query(
        r#"
        INSERT INTO companies (
            id, tax_number, name, address, email, phone,
            creation_date, closing_date, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&company.id)
    .bind(&company.tax_number)
    .bind(&company.name)
    .bind(&company.address)
    .bind(&company.email)
    .bind(&company.phone)
    .bind(company.creation_date)
    .bind(company.closing_date)
    .bind(company.created_at)
    .bind(company.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(company)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{company_input, date};
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_company_is_a_singleton() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.company().get().await.unwrap().is_none());

        let created = db.company().create(company_input()).await.unwrap();
        let err = db.company().create(company_input()).await.unwrap_err();
        assert_eq!(err.to_string(), "An instance of Company already exists");

        let mut input = company_input();
        input.name = "Renamed SA".to_string();
        let saved = db.company().save(input).await.unwrap();
        assert_eq!(saved.id, created.id);
        assert_eq!(db.company().get().await.unwrap().unwrap().name, "Renamed SA");
    }

    #[tokio::test]
    async fn test_company_validation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut input = company_input();
        input.email = "not-an-email".to_string();
        assert!(matches!(
            db.company().save(input).await,
            Err(DbError::Rejected(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_periods() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut input = company_input();
        input.closing_date = date(2020, 6, 30);
        db.company().save(input).await.unwrap();

        let periods = db
            .company()
            .periods(YearKind::Financial, Some(2025))
            .await
            .unwrap();
        assert_eq!(periods.current.start, date(2024, 7, 1));

        assert!(matches!(
            db.company().periods(YearKind::Calendar, None).await,
            Err(DbError::Rejected(CoreError::NoCurrentFinancialYear))
        ));
    }
}
