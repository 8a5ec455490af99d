//! Integration tests for the purchase store against in-memory SQLite.

use ordersync_core::Purchase;
use ordersync_db::{
    connect_pool, count_purchases, ensure_schema, list_purchases, upsert_purchases, PoolConfig,
};
use sqlx::SqlitePool;

/// One connection only: each `sqlite::memory:` connection is its own database.
async fn memory_pool() -> SqlitePool {
    let config = PoolConfig {
        max_connections: 1,
        min_connections: 1,
        acquire_timeout_secs: 5,
    };
    connect_pool("sqlite::memory:", config)
        .await
        .expect("in-memory pool should connect")
}

fn purchase(order_id: &str, purchase_date: &str, sku: &str) -> Purchase {
    Purchase {
        order_id: order_id.to_owned(),
        purchase_date: purchase_date.to_owned(),
        sku: sku.to_owned(),
    }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let pool = memory_pool().await;

    ensure_schema(&pool).await.expect("first create");
    ensure_schema(&pool).await.expect("second create is a no-op");

    assert_eq!(count_purchases(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn upsert_inserts_new_rows() {
    let pool = memory_pool().await;
    ensure_schema(&pool).await.unwrap();

    let batch = vec![
        purchase("A-1", "2023-01-01T00:00:00", "SKU1"),
        purchase("A-2", "2023-01-02T00:00:00", "SKU2"),
    ];
    let inserted = upsert_purchases(&pool, &batch).await.unwrap();

    assert_eq!(inserted, 2);
    let rows = list_purchases(&pool).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].order_id, "A-1");
    assert_eq!(rows[0].sku, "SKU1");
    assert_eq!(rows[1].order_id, "A-2");
    assert_eq!(rows[1].sku, "SKU2");
}

#[tokio::test]
async fn repeated_batch_is_a_no_op() {
    let pool = memory_pool().await;
    ensure_schema(&pool).await.unwrap();

    let batch = vec![
        purchase("A-1", "2023-01-01T00:00:00", "SKU1"),
        purchase("A-2", "2023-01-02T00:00:00", "SKU2"),
    ];
    upsert_purchases(&pool, &batch).await.unwrap();
    let before = list_purchases(&pool).await.unwrap();

    let inserted = upsert_purchases(&pool, &batch).await.unwrap();

    assert_eq!(inserted, 0, "re-running an identical batch inserts nothing");
    let after = list_purchases(&pool).await.unwrap();
    assert_eq!(after, before, "store content unchanged after second call");
    assert_eq!(count_purchases(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn mixed_batch_inserts_only_new_pairs() {
    let pool = memory_pool().await;
    ensure_schema(&pool).await.unwrap();

    upsert_purchases(&pool, &[purchase("A-1", "2023-01-01T00:00:00", "SKU1")])
        .await
        .unwrap();

    let batch = vec![
        purchase("A-1", "2023-01-01T00:00:00", "SKU1"),
        purchase("A-1", "2023-01-01T00:00:00", "SKU2"),
    ];
    let inserted = upsert_purchases(&pool, &batch).await.unwrap();

    assert_eq!(inserted, 1, "same order id with a new SKU is a new line");
    assert_eq!(count_purchases(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn purchase_date_is_not_part_of_the_key() {
    let pool = memory_pool().await;
    ensure_schema(&pool).await.unwrap();

    upsert_purchases(&pool, &[purchase("A-1", "2023-01-01T00:00:00", "SKU1")])
        .await
        .unwrap();
    let inserted = upsert_purchases(&pool, &[purchase("A-1", "2023-06-30T12:00:00", "SKU1")])
        .await
        .unwrap();

    assert_eq!(inserted, 0, "same (order_id, sku) with a new date is a no-op");
    let rows = list_purchases(&pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].purchase_date, "2023-01-01T00:00:00",
        "the first-seen date is retained"
    );
}

#[tokio::test]
async fn empty_batch_succeeds() {
    let pool = memory_pool().await;
    ensure_schema(&pool).await.unwrap();

    let inserted = upsert_purchases(&pool, &[]).await.unwrap();

    assert_eq!(inserted, 0);
    assert_eq!(count_purchases(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn upsert_without_schema_fails_and_store_stays_absent() {
    let pool = memory_pool().await;

    let result = upsert_purchases(&pool, &[purchase("A-1", "2023-01-01T00:00:00", "SKU1")]).await;

    assert!(result.is_err(), "missing table must surface as an error");
}
