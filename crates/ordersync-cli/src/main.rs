use anyhow::Context;
use clap::Parser;

mod pipeline;

#[derive(Debug, Parser)]
#[command(name = "ordersync")]
#[command(about = "Pulls a trailing-window order report and lands purchase records in SQLite")]
struct Cli {
    /// Override the configured report window, in days.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    window_days: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Diagnostics go to stderr; stdout stays clean for callers.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ordersync_core::load_app_config_from_env()?;
    if let Some(days) = cli.window_days {
        config.window_days = days;
    }

    let client = ordersync_reports::ReportsClient::new(
        &config.access_key,
        &config.secret_key,
        &config.seller_id,
        config.request_timeout_secs,
        &config.api_base_url,
    )?;

    let pool = ordersync_db::connect_pool(&config.database_url, ordersync_db::PoolConfig::from_env())
        .await
        .context("connecting to the purchase store")?;

    let result = pipeline::run_pipeline(&config, &pool, &client).await;

    // Release the store connections on every exit path before surfacing the outcome.
    pool.close().await;

    match result {
        Ok(summary) => {
            tracing::info!(
                request_id = %summary.request_id,
                report_id = %summary.report_id,
                parsed = summary.parsed,
                inserted = summary.inserted,
                "order report synced"
            );
            Ok(())
        }
        Err(err) => {
            // Single report: the chain is logged here, not re-printed by anyhow.
            tracing::error!(error = format!("{err:#}"), "pipeline run failed");
            std::process::exit(1);
        }
    }
}
