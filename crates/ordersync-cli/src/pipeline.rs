//! One full sync run: request → poll → fetch → parse → persist.
//!
//! Each stage either succeeds or aborts the run; there is no cross-stage
//! recovery. If polling times out or fails, the operator re-invokes the whole
//! pipeline — the store's idempotent upsert makes a repeated run safe.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use sqlx::SqlitePool;

use ordersync_core::AppConfig;
use ordersync_reports::poller::{poll_for_report, PollPolicy, TokioSleep};
use ordersync_reports::{parse_order_report, ReportsClient};

/// Counters from a completed run, for the exit log line.
#[derive(Debug)]
pub struct RunSummary {
    pub request_id: String,
    pub report_id: String,
    pub parsed: usize,
    pub inserted: u64,
}

/// Runs the pipeline once against the given store pool and client.
///
/// # Errors
///
/// Returns the first stage failure: authentication rejection, exhausted
/// retries or timeout while polling, a malformed report document, or a
/// storage fault. A parse failure persists nothing.
pub async fn run_pipeline(
    config: &AppConfig,
    pool: &SqlitePool,
    client: &ReportsClient,
) -> anyhow::Result<RunSummary> {
    ordersync_db::ensure_schema(pool)
        .await
        .context("creating purchases schema")?;

    let window_end = Utc::now();
    let window_start = window_end - chrono::Duration::days(i64::from(config.window_days));

    tracing::info!(
        report_type = %config.report_type,
        %window_start,
        %window_end,
        "requesting order report"
    );
    let request_id = client
        .create_report(&config.report_type, window_start, window_end)
        .await
        .context("requesting report generation")?;

    let policy = PollPolicy {
        poll_interval: Duration::from_secs(config.poll_interval_secs),
        retry_backoff: Duration::from_secs(config.retry_backoff_secs),
        max_transient_retries: config.max_transient_retries,
        max_polls: config.max_polls,
    };
    let report_id = poll_for_report(&policy, &TokioSleep, &request_id, || {
        client.get_report_status(&request_id)
    })
    .await
    .context("polling for report generation")?;

    tracing::info!(%request_id, %report_id, "report generated; fetching document");
    let payload = client
        .get_report_document(&report_id)
        .await
        .context("fetching report document")?;

    let purchases = parse_order_report(&payload).context("parsing report document")?;

    let inserted = ordersync_db::upsert_purchases(pool, &purchases)
        .await
        .context("persisting purchase records")?;

    Ok(RunSummary {
        request_id,
        report_id,
        parsed: purchases.len(),
        inserted,
    })
}
