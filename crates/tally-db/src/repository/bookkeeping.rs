//! # Bookkeeping Repository
//!
//! Chart of accounts and the journal.
//!
//! ## Posting an Entry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  post_entry(input)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  clean_journal_entry ── description ≤ 80, amounts in range             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check_balanced ── ≥ 2 lines, one side per line, debit == credit       │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  every account exists and is allocable                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  number = MAX(number) + 1, locked                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  entry + lines ── COMMIT                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::bookkeeping::{account_label, check_balanced};
use tally_core::validation::{clean_chart_account, clean_chart_category, clean_journal_entry};
use tally_core::{
    ChartAccount, ChartAccountInput, ChartCategory, ChartCategoryInput, CoreError, JournalEntry,
    JournalEntryInput, JournalLine,
};

use crate::error::{DbError, DbResult};

const ACCOUNT_SELECT: &str = r#"
    SELECT
        a.id, a.code, a.name, a.category_id, a.allocable,
        c.code || a.code || ' ' || a.name AS label
    FROM chart_accounts a
    JOIN chart_categories c ON c.id = a.category_id
"#;

const ENTRY_COLUMNS: &str = "id, number, date, description, locked, created_at";

/// Repository for the chart of accounts and journal entries.
#[derive(Debug, Clone)]
pub struct BookkeepingRepository {
    pool: SqlitePool,
}

impl BookkeepingRepository {
    /// Creates a new BookkeepingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookkeepingRepository { pool }
    }

    // =========================================================================
    // Chart of Accounts
    // =========================================================================

    pub async fn list_categories(&self) -> DbResult<Vec<ChartCategory>> {
        let categories = sqlx::query_as::<_, ChartCategory>(
            "SELECT id, code, name FROM chart_categories ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn create_category(&self, input: ChartCategoryInput) -> DbResult<ChartCategory> {
        let input = clean_chart_category(input)?;
        let category = ChartCategory {
            id: Uuid::new_v4().to_string(),
            code: input.code,
            name: input.name,
        };

        debug!(id = %category.id, code = %category.code, "Creating chart category");

        sqlx::query("INSERT INTO chart_categories (id, code, name) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.code)
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_duplicate(e, "code", category.code.clone()))?;

        Ok(category)
    }

    /// Accounts ordered by category code, then account code.
    pub async fn list_accounts(&self) -> DbResult<Vec<ChartAccount>> {
        let sql = format!("{} ORDER BY c.code, a.code", ACCOUNT_SELECT);
        let accounts = sqlx::query_as::<_, ChartAccount>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    pub async fn create_account(&self, input: ChartAccountInput) -> DbResult<ChartAccount> {
        let input = clean_chart_account(input)?;
        let mut conn = self.pool.acquire().await?;

        let category_code: String =
            sqlx::query_scalar("SELECT code FROM chart_categories WHERE id = ?1")
                .bind(&input.category_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| DbError::not_found("ChartCategory", &input.category_id))?;

        let account = ChartAccount {
            id: Uuid::new_v4().to_string(),
            label: account_label(&category_code, &input.code, &input.name),
            code: input.code,
            name: input.name,
            category_id: input.category_id,
            allocable: input.allocable,
        };

        debug!(id = %account.id, label = %account.label, "Creating chart account");

        sqlx::query(
            r#"
            INSERT INTO chart_accounts (id, code, name, category_id, allocable)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.code)
        .bind(&account.name)
        .bind(&account.category_id)
        .bind(account.allocable)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::on_duplicate(e, "code", account.code.clone()))?;

        Ok(account)
    }

    // =========================================================================
    // Journal
    // =========================================================================

    /// Entries by number, without their lines.
    pub async fn list_entries(&self) -> DbResult<Vec<JournalEntry>> {
        let sql = format!(
            "SELECT {} FROM journal_entries ORDER BY number",
            ENTRY_COLUMNS
        );
        let entries = sqlx::query_as::<_, JournalEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn get_entry(&self, id: &str) -> DbResult<Option<JournalEntry>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {} FROM journal_entries WHERE id = ?1", ENTRY_COLUMNS);
        let entry = sqlx::query_as::<_, JournalEntry>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match entry {
            Some(mut entry) => {
                entry.lines = fetch_lines(&mut conn, id).await?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Posts a balanced entry. A rejected entry writes nothing.
    pub async fn post_entry(&self, input: JournalEntryInput) -> DbResult<JournalEntry> {
        let input = clean_journal_entry(input)?;
        let total = check_balanced(&input.lines)?;
        let mut tx = self.pool.begin().await?;

        for line in &input.lines {
            require_allocable(&mut tx, &line.account_id).await?;
        }

        let number: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(number), 0) + 1 FROM journal_entries")
            .fetch_one(&mut *tx)
            .await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO journal_entries (id, number, date, description, locked, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
        )
        .bind(&id)
        .bind(number)
        .bind(input.date)
        .bind(&input.description)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (index, line) in input.lines.iter().enumerate() {
            let line = JournalLine {
                id: Uuid::new_v4().to_string(),
                entry_id: id.clone(),
                position: index as i64 + 1,
                account_id: line.account_id.clone(),
                debit_cents: line.debit_cents,
                credit_cents: line.credit_cents,
            };
            sqlx::query(
                r#"
                INSERT INTO journal_lines (id, entry_id, position, account_id, debit_cents, credit_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&line.id)
            .bind(&line.entry_id)
            .bind(line.position)
            .bind(&line.account_id)
            .bind(line.debit_cents)
            .bind(line.credit_cents)
            .execute(&mut *tx)
            .await?;
            lines.push(line);
        }

        tx.commit().await?;
        info!(id = %id, number, total = %total, "Posted journal entry");

        Ok(JournalEntry {
            id,
            number,
            date: input.date,
            description: input.description,
            locked: true,
            created_at: now,
            lines,
        })
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

async fn fetch_lines(conn: &mut SqliteConnection, entry_id: &str) -> DbResult<Vec<JournalLine>> {
    let lines = sqlx::query_as::<_, JournalLine>(
        r#"
        SELECT id, entry_id, position, account_id, debit_cents, credit_cents
        FROM journal_lines
        WHERE entry_id = ?1
        ORDER BY position
        "#,
    )
    .bind(entry_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(lines)
}

async fn require_allocable(conn: &mut SqliteConnection, account_id: &str) -> DbResult<()> {
    let sql = format!("{} WHERE a.id = ?1", ACCOUNT_SELECT);
    let account = sqlx::query_as::<_, ChartAccount>(&sql)
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("ChartAccount", account_id))?;

    if !account.allocable {
        return Err(CoreError::AccountNotAllocable(account.label).into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::date;
    use crate::{Database, DbConfig};
    use tally_core::JournalLineInput;

    struct Chart {
        db: Database,
        cash: String,
        sales: String,
        summary: String,
    }

    async fn chart() -> Chart {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let books = db.bookkeeping();
        let assets = books
            .create_category(ChartCategoryInput {
                code: "1".to_string(),
                name: "Assets".to_string(),
            })
            .await
            .unwrap();
        let income = books
            .create_category(ChartCategoryInput {
                code: "4".to_string(),
                name: "Income".to_string(),
            })
            .await
            .unwrap();

        let account = |code: &str, name: &str, category_id: &str, allocable: bool| ChartAccountInput {
            code: code.to_string(),
            name: name.to_string(),
            category_id: category_id.to_string(),
            allocable,
        };
        let cash = books
            .create_account(account("101", "Cash", &assets.id, true))
            .await
            .unwrap();
        let sales = books
            .create_account(account("401", "Sales", &income.id, true))
            .await
            .unwrap();
        let summary = books
            .create_account(account("100", "Assets summary", &assets.id, false))
            .await
            .unwrap();

        Chart {
            db,
            cash: cash.id,
            sales: sales.id,
            summary: summary.id,
        }
    }

    fn line(account_id: &str, debit: i64, credit: i64) -> JournalLineInput {
        JournalLineInput {
            account_id: account_id.to_string(),
            debit_cents: debit,
            credit_cents: credit,
        }
    }

    fn entry(lines: Vec<JournalLineInput>) -> JournalEntryInput {
        JournalEntryInput {
            date: date(2024, 5, 2),
            description: " Cash sale ".to_string(),
            lines,
        }
    }

    #[tokio::test]
    async fn test_chart_labels() {
        let chart = chart().await;
        let accounts = chart.db.bookkeeping().list_accounts().await.unwrap();
        let labels: Vec<&str> = accounts.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["01100 Assets summary", "01101 Cash", "04401 Sales"]);

        let err = chart
            .db
            .bookkeeping()
            .create_category(ChartCategoryInput {
                code: "01".to_string(),
                name: "Again".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_post_balanced_entries() {
        let chart = chart().await;
        let books = chart.db.bookkeeping();

        let first = books
            .post_entry(entry(vec![line(&chart.cash, 1000, 0), line(&chart.sales, 0, 1000)]))
            .await
            .unwrap();
        let second = books
            .post_entry(entry(vec![line(&chart.cash, 500, 0), line(&chart.sales, 0, 500)]))
            .await
            .unwrap();

        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);
        assert!(first.locked);
        assert_eq!(first.description, "Cash sale");

        let fetched = books.get_entry(&second.id).await.unwrap().unwrap();
        assert_eq!(fetched.lines.len(), 2);
        assert_eq!(fetched.lines[1].credit_cents, 500);
    }

    #[tokio::test]
    async fn test_rejected_entry_leaves_nothing() {
        let chart = chart().await;
        let books = chart.db.bookkeeping();

        let err = books
            .post_entry(entry(vec![line(&chart.cash, 1000, 0), line(&chart.sales, 0, 999)]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Debit must be equal to credit");

        assert!(matches!(
            books
                .post_entry(entry(vec![line(&chart.summary, 10, 0), line(&chart.sales, 0, 10)]))
                .await,
            Err(DbError::Rejected(CoreError::AccountNotAllocable(label))) if label == "01100 Assets summary"
        ));

        assert!(books.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_description_and_amounts_are_validated() {
        let chart = chart().await;
        let books = chart.db.bookkeeping();
        let balanced = || vec![line(&chart.cash, 1000, 0), line(&chart.sales, 0, 1000)];

        let err = books
            .post_entry(JournalEntryInput {
                description: String::new(),
                ..entry(balanced())
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "description is required");

        let err = books
            .post_entry(JournalEntryInput {
                description: "x".repeat(81),
                ..entry(balanced())
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "description must be at most 80 characters");

        let err = books
            .post_entry(entry(vec![
                line(&chart.cash, i64::MAX, 0),
                line(&chart.cash, 1, 0),
                line(&chart.sales, 0, 1),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Validation(_))));

        assert!(books.list_entries().await.unwrap().is_empty());
    }
}
