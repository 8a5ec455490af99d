//! Database operations for the `purchases` table.
//!
//! The table is keyed by `(order_id, sku)`: the same order line reported by
//! two runs with overlapping windows lands exactly once. `purchase_date` is
//! informational and never part of the key.

use sqlx::SqlitePool;

use ordersync_core::Purchase;

use crate::DbError;

/// A row from the `purchases` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PurchaseRow {
    pub order_id: String,
    pub purchase_date: String,
    pub sku: String,
}

/// Idempotently creates the `purchases` table.
///
/// Safe to call on every run; an existing table is left untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the DDL statement fails.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS purchases ( \
             order_id      TEXT NOT NULL, \
             purchase_date TEXT NOT NULL, \
             sku           TEXT NOT NULL, \
             PRIMARY KEY (order_id, sku) \
         )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Inserts the batch in one transaction, ignoring already-present rows.
///
/// A record whose `(order_id, sku)` already exists is a no-op, not an error
/// and not a duplicate row. The transaction commits only after every record
/// has been applied; any failure rolls the whole batch back, so the store is
/// never left partially written.
///
/// Returns the number of rows that were newly inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails.
pub async fn upsert_purchases(pool: &SqlitePool, purchases: &[Purchase]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for purchase in purchases {
        let result = sqlx::query(
            "INSERT INTO purchases (order_id, purchase_date, sku) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (order_id, sku) DO NOTHING",
        )
        .bind(&purchase.order_id)
        .bind(&purchase.purchase_date)
        .bind(&purchase.sku)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Counts the rows in `purchases`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_purchases(pool: &SqlitePool) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Lists all purchase rows, ordered by `(order_id, sku)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_purchases(pool: &SqlitePool) -> Result<Vec<PurchaseRow>, DbError> {
    let rows = sqlx::query_as::<_, PurchaseRow>(
        "SELECT order_id, purchase_date, sku FROM purchases ORDER BY order_id, sku",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
