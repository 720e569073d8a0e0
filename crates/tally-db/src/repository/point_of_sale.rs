//! # Point of Sale Repository
//!
//! Points of sale are never deleted: disabling one stops new documents on it
//! while its history stays intact.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use tally_core::validation::clean_point_of_sale;
use tally_core::{CoreError, PointOfSale, PointOfSaleInput};

use crate::error::{DbError, DbResult};

/// Repository for points of sale.
#[derive(Debug, Clone)]
pub struct PointOfSaleRepository {
    pool: SqlitePool,
}

impl PointOfSaleRepository {
    /// Creates a new PointOfSaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PointOfSaleRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<PointOfSale>> {
        let points = sqlx::query_as::<_, PointOfSale>(
            "SELECT id, pos_number, disabled FROM points_of_sale ORDER BY pos_number",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(points)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<PointOfSale>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    pub async fn create(&self, input: PointOfSaleInput) -> DbResult<PointOfSale> {
        let input = clean_point_of_sale(input)?;
        let point = PointOfSale {
            id: Uuid::new_v4().to_string(),
            pos_number: input.pos_number,
            disabled: input.disabled,
        };

        debug!(id = %point.id, pos_number = %point.pos_number, "Creating point of sale");

        sqlx::query("INSERT INTO points_of_sale (id, pos_number, disabled) VALUES (?1, ?2, ?3)")
            .bind(&point.id)
            .bind(&point.pos_number)
            .bind(point.disabled)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_duplicate(e, "pos_number", point.pos_number.clone()))?;

        Ok(point)
    }

    /// Renumbers or enables/disables a point of sale.
    pub async fn update(&self, id: &str, input: PointOfSaleInput) -> DbResult<PointOfSale> {
        let input = clean_point_of_sale(input)?;
        debug!(id = %id, pos_number = %input.pos_number, disabled = input.disabled, "Updating point of sale");

        let result =
            sqlx::query("UPDATE points_of_sale SET pos_number = ?1, disabled = ?2 WHERE id = ?3")
                .bind(&input.pos_number)
                .bind(input.disabled)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::on_duplicate(e, "pos_number", input.pos_number.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PointOfSale", id));
        }
        Ok(PointOfSale {
            id: id.to_string(),
            pos_number: input.pos_number,
            disabled: input.disabled,
        })
    }
}

// =============================================================================
// Connection Helpers
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<PointOfSale>> {
    let point = sqlx::query_as::<_, PointOfSale>(
        "SELECT id, pos_number, disabled FROM points_of_sale WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(point)
}

/// Point of sale by its zero-filled number.
pub(crate) async fn by_number(
    conn: &mut SqliteConnection,
    pos_number: &str,
) -> DbResult<Option<PointOfSale>> {
    let point = sqlx::query_as::<_, PointOfSale>(
        "SELECT id, pos_number, disabled FROM points_of_sale WHERE pos_number = ?1",
    )
    .bind(pos_number)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(point)
}

/// The point of sale, if it exists and accepts documents.
pub(crate) async fn require_enabled(conn: &mut SqliteConnection, id: &str) -> DbResult<PointOfSale> {
    let point = fetch(conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("PointOfSale", id))?;

    if point.disabled {
        return Err(CoreError::PointOfSaleDisabled {
            pos_number: point.pos_number,
        }
        .into());
    }
    Ok(point)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn input(number: &str, disabled: bool) -> PointOfSaleInput {
        PointOfSaleInput {
            pos_number: number.to_string(),
            disabled,
        }
    }

    #[tokio::test]
    async fn test_zero_filled_and_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let point = db.points_of_sale().create(input("3", false)).await.unwrap();
        assert_eq!(point.pos_number, "00003");

        assert!(matches!(
            db.points_of_sale().create(input("00003", false)).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert!(matches!(
            db.points_of_sale().create(input("123456", false)).await,
            Err(DbError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_point_rejects_documents() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let point = db.points_of_sale().create(input("1", false)).await.unwrap();
        db.points_of_sale()
            .update(&point.id, input("1", true))
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = require_enabled(&mut conn, &point.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::PointOfSaleDisabled { .. })
        ));
        assert!(by_number(&mut conn, "00001").await.unwrap().is_some());
    }
}
