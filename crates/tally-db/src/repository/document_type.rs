//! # Document Type Repository
//!
//! Invoice types (`001 FA FACTURA A`, ...). Codes are zero-filled to three
//! digits; types and descriptions are stored upper-cased.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use tally_core::validation::clean_document_type;
use tally_core::{DocumentType, DocumentTypeInput};

use crate::error::{DbError, DbResult};

const DOCUMENT_TYPE_COLUMNS: &str = "id, code, doc_type, description, hide";

/// Repository for document types.
#[derive(Debug, Clone)]
pub struct DocumentTypeRepository {
    pool: SqlitePool,
}

impl DocumentTypeRepository {
    /// Creates a new DocumentTypeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentTypeRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<DocumentType>> {
        let sql = format!(
            "SELECT {} FROM document_types ORDER BY code",
            DOCUMENT_TYPE_COLUMNS
        );
        let types = sqlx::query_as::<_, DocumentType>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<DocumentType>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    pub async fn create(&self, input: DocumentTypeInput) -> DbResult<DocumentType> {
        let input = clean_document_type(input)?;
        let doc_type = DocumentType {
            id: Uuid::new_v4().to_string(),
            code: input.code,
            doc_type: input.doc_type,
            description: input.description,
            hide: input.hide,
        };

        debug!(id = %doc_type.id, code = %doc_type.code, "Creating document type");

        sqlx::query(
            r#"
            INSERT INTO document_types (id, code, doc_type, description, hide)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&doc_type.id)
        .bind(&doc_type.code)
        .bind(&doc_type.doc_type)
        .bind(&doc_type.description)
        .bind(doc_type.hide)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::on_duplicate(e, "code", doc_type.code.clone()))?;

        Ok(doc_type)
    }

    pub async fn update(&self, id: &str, input: DocumentTypeInput) -> DbResult<DocumentType> {
        let input = clean_document_type(input)?;
        debug!(id = %id, code = %input.code, "Updating document type");

        let result = sqlx::query(
            r#"
            UPDATE document_types
            SET code = ?1, doc_type = ?2, description = ?3, hide = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&input.code)
        .bind(&input.doc_type)
        .bind(&input.description)
        .bind(input.hide)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::on_duplicate(e, "code", input.code.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("DocumentType", id));
        }
        Ok(DocumentType {
            id: id.to_string(),
            code: input.code,
            doc_type: input.doc_type,
            description: input.description,
            hide: input.hide,
        })
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<DocumentType>> {
    let sql = format!(
        "SELECT {} FROM document_types WHERE id = ?1",
        DOCUMENT_TYPE_COLUMNS
    );
    let doc_type = sqlx::query_as::<_, DocumentType>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(doc_type)
}

/// Document type by its zero-filled code.
pub(crate) async fn by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> DbResult<Option<DocumentType>> {
    let sql = format!(
        "SELECT {} FROM document_types WHERE code = ?1",
        DOCUMENT_TYPE_COLUMNS
    );
    let doc_type = sqlx::query_as::<_, DocumentType>(&sql)
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(doc_type)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db
            .document_types()
            .create(DocumentTypeInput {
                code: "6".to_string(),
                doc_type: "fb".to_string(),
                description: "factura b".to_string(),
                hide: true,
            })
            .await
            .unwrap();
        assert_eq!(created.code, "006");
        assert_eq!(created.doc_type, "FB");

        let updated = db
            .document_types()
            .update(
                &created.id,
                DocumentTypeInput {
                    code: "6".to_string(),
                    doc_type: "fb".to_string(),
                    description: "Factura B".to_string(),
                    hide: false,
                },
            )
            .await
            .unwrap();
        assert!(!updated.hide);

        let mut conn = db.pool().acquire().await.unwrap();
        let found = by_code(&mut conn, "006").await.unwrap().unwrap();
        assert_eq!(found.description, "FACTURA B");
    }
}
