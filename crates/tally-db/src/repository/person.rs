//! # Person Repository
//!
//! Clients and suppliers share one shape and one repository; the kind picks
//! the table.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create()  clean ─► tax number != company's ─► INSERT                   │
//! │                                              └► opening account entry  │
//! │                                                                         │
//! │  delete()  documents reference the person? ── yes ─► Restricted (409)  │
//! │                                             └─ no ─► DELETE (entries   │
//! │                                                      cascade)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::validation::clean_person;
use tally_core::{CoreError, Person, PersonInput, PersonKind};

use crate::error::{DbError, DbResult};
use crate::repository::{company, current_account};

const PERSON_COLUMNS: &str =
    "id, tax_number, name, address, email, phone, created_at, updated_at";

/// Repository for clients or suppliers.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
    kind: PersonKind,
}

impl PersonRepository {
    /// Creates a new PersonRepository for one kind of person.
    pub fn new(pool: SqlitePool, kind: PersonKind) -> Self {
        PersonRepository { pool, kind }
    }

    pub fn kind(&self) -> PersonKind {
        self.kind
    }

    /// Lists persons by name. `search` matches name or tax number.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Person>> {
        let pattern = format!("%{}%", search.unwrap_or("").trim());
        let sql = format!(
            r#"
            SELECT {} FROM {}
            WHERE name LIKE ?1 OR tax_number LIKE ?1
            ORDER BY name
            "#,
            PERSON_COLUMNS,
            table(self.kind)
        );
        let persons = sqlx::query_as::<_, Person>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(persons)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Person>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, self.kind, id).await
    }

    pub async fn find_by_tax_number(&self, tax_number: &str) -> DbResult<Option<Person>> {
        let mut conn = self.pool.acquire().await?;
        by_tax_number(&mut conn, self.kind, tax_number).await
    }

    /// Creates a person and opens its current account.
    pub async fn create(&self, input: PersonInput) -> DbResult<Person> {
        let mut tx = self.pool.begin().await?;
        let person = insert(&mut tx, self.kind, input).await?;
        tx.commit().await?;
        Ok(person)
    }

    pub async fn update(&self, id: &str, input: PersonInput) -> DbResult<Person> {
        let input = clean_person(input)?;
        let mut tx = self.pool.begin().await?;

        let existing = fetch(&mut tx, self.kind, id)
            .await?
            .ok_or_else(|| DbError::not_found(self.kind.to_string(), id))?;
        check_company_tax_number(&mut tx, &input.tax_number).await?;

        debug!(id = %id, kind = %self.kind, "Updating person");

        let now = Utc::now();
        let sql = format!(
            r#"
            UPDATE {} SET
                tax_number = ?1, name = ?2, address = ?3, email = ?4, phone = ?5,
                updated_at = ?6
            WHERE id = ?7
            "#,
            table(self.kind)
        );
        sqlx::query(&sql)
            .bind(&input.tax_number)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::on_duplicate(e, "tax_number", input.tax_number.clone()))?;

        tx.commit().await?;
        Ok(Person {
            tax_number: input.tax_number,
            name: input.name,
            address: input.address,
            email: input.email,
            phone: input.phone,
            updated_at: now,
            ..existing
        })
    }

    /// Deletes a person with no documents.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete(&mut conn, self.kind, id).await
    }

    /// Deletes every listed person, or none of them.
    pub async fn delete_many(&self, ids: &[String]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            delete(&mut tx, self.kind, id).await?;
        }
        tx.commit().await?;

        info!(count = ids.len(), kind = %self.kind, "Bulk deleted persons");
        Ok(ids.len())
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) fn table(kind: PersonKind) -> &'static str {
    match kind {
        PersonKind::Client => "clients",
        PersonKind::Supplier => "suppliers",
    }
}

pub(crate) async fn fetch(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    id: &str,
) -> DbResult<Option<Person>> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", PERSON_COLUMNS, table(kind));
    let person = sqlx::query_as::<_, Person>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(person)
}

pub(crate) async fn by_tax_number(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    tax_number: &str,
) -> DbResult<Option<Person>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE tax_number = ?1",
        PERSON_COLUMNS,
        table(kind)
    );
    let person = sqlx::query_as::<_, Person>(&sql)
        .bind(tax_number.trim())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(person)
}

/// Validates, inserts and opens the current account.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    kind: PersonKind,
    input: PersonInput,
) -> DbResult<Person> {
    let input = clean_person(input)?;
    let company = check_company_tax_number(conn, &input.tax_number).await?;

    let now = Utc::now();
    let person = Person {
        id: Uuid::new_v4().to_string(),
        tax_number: input.tax_number,
        name: input.name,
        address: input.address,
        email: input.email,
        phone: input.phone,
        created_at: now,
        updated_at: now,
    };

    debug!(id = %person.id, kind = %kind, tax_number = %person.tax_number, "Creating person");

    let sql = format!(
        r#"
        INSERT INTO {} (
            id, tax_number, name, address, email, phone, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        table(kind)
    );
    sqlx::query(&sql)
        .bind(&person.id)
        .bind(&person.tax_number)
        .bind(&person.name)
        .bind(&person.address)
        .bind(&person.email)
        .bind(&person.phone)
        .bind(person.created_at)
        .bind(person.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::on_duplicate(e, "tax_number", person.tax_number.clone()))?;

    current_account::open(conn, kind, &person.id, company.creation_date).await?;

    Ok(person)
}

async fn delete(conn: &mut SqliteConnection, kind: PersonKind, id: &str) -> DbResult<()> {
    debug!(id = %id, kind = %kind, "Deleting person");

    let sql = format!("DELETE FROM {} WHERE id = ?1", table(kind));
    let reason = format!("The {} you're trying to delete has related documents.", kind.as_str());
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::on_restrict(e, &kind.to_string(), &reason))?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(kind.to_string(), id));
    }
    Ok(())
}

/// Persons may not reuse the company's tax number. Returns the company.
async fn check_company_tax_number(
    conn: &mut SqliteConnection,
    tax_number: &str,
) -> DbResult<tally_core::Company> {
    let company = company::require(conn).await?;
    if company.tax_number == tax_number {
        return Err(CoreError::TaxNumberBelongsToCompany(tax_number.to_string()).into());
    }
    Ok(company)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{company_input, date, ledger, person_input};
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_person_requires_company() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(matches!(
            db.clients().create(person_input("20111111112", "Acme")).await,
            Err(DbError::Rejected(CoreError::CompanyNotConfigured))
        ));
    }

    #[tokio::test]
    async fn test_create_update_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.company().save(company_input()).await.unwrap();

        let acme = db
            .clients()
            .create(person_input("20111111112", "Acme"))
            .await
            .unwrap();
        db.clients()
            .create(person_input("20333333334", "Beta"))
            .await
            .unwrap();

        let found = db.clients().list(Some("acm")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, acme.id);

        let updated = db
            .clients()
            .update(&acme.id, person_input("20111111112", "Acme Holdings"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme Holdings");
        assert_eq!(updated.created_at, acme.created_at);

        // Suppliers live in their own table
        assert!(db.suppliers().list(None).await.unwrap().is_empty());
        assert!(db.suppliers().get(&acme.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tax_number_rules() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let company = db.company().save(company_input()).await.unwrap();

        assert!(matches!(
            db.clients()
                .create(person_input(&company.tax_number, "Self"))
                .await,
            Err(DbError::Rejected(CoreError::TaxNumberBelongsToCompany(_)))
        ));

        db.clients()
            .create(person_input("20111111112", "Acme"))
            .await
            .unwrap();
        let err = db
            .clients()
            .create(person_input("20111111112", "Acme again"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "tax_number"));

        // Same tax number is fine for the other kind
        db.suppliers()
            .create(person_input("20111111112", "Acme supplies"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_restricted_by_documents() {
        let ledger = ledger().await;
        let db = &ledger.db;

        db.sale_invoices()
            .create(ledger.invoice("1", date(2024, 1, 10), 1000))
            .await
            .unwrap();

        let err = db.clients().delete(&ledger.client_id).await.unwrap_err();
        assert!(matches!(err, DbError::Restricted { .. }));
        assert!(db.clients().get(&ledger.client_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_many_is_atomic() {
        let ledger = ledger().await;
        let db = &ledger.db;
        let free = db
            .clients()
            .create(person_input("20444444445", "Free"))
            .await
            .unwrap();
        db.sale_invoices()
            .create(ledger.invoice("1", date(2024, 1, 10), 1000))
            .await
            .unwrap();

        let ids = vec![free.id.clone(), ledger.client_id.clone()];
        assert!(db.clients().delete_many(&ids).await.is_err());
        assert!(db.clients().get(&free.id).await.unwrap().is_some());

        assert_eq!(db.clients().delete_many(&[free.id.clone()]).await.unwrap(), 1);
        assert!(db.clients().get(&free.id).await.unwrap().is_none());
    }
}
