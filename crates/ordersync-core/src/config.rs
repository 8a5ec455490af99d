use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "https://reports.marketplace-services.com";
const DEFAULT_REPORT_TYPE: &str = "_GET_XML_ALL_ORDERS_DATA_BY_ORDER_DATE_";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let access_key = require("ORDERSYNC_ACCESS_KEY")?;
    let secret_key = require("ORDERSYNC_SECRET_KEY")?;
    let seller_id = require("ORDERSYNC_SELLER_ID")?;

    let api_base_url = or_default("ORDERSYNC_API_BASE_URL", DEFAULT_API_BASE_URL);
    let database_url = or_default("DATABASE_URL", "sqlite:ordersync.db");
    let report_type = or_default("ORDERSYNC_REPORT_TYPE", DEFAULT_REPORT_TYPE);

    let window_days = parse_u32("ORDERSYNC_WINDOW_DAYS", "7")?;
    if window_days == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ORDERSYNC_WINDOW_DAYS".to_string(),
            reason: "report window must be at least one day".to_string(),
        });
    }

    let poll_interval_secs = parse_u64("ORDERSYNC_POLL_INTERVAL_SECS", "3")?;
    let retry_backoff_secs = parse_u64("ORDERSYNC_RETRY_BACKOFF_SECS", "3")?;
    let max_transient_retries = parse_u32("ORDERSYNC_MAX_TRANSIENT_RETRIES", "3")?;
    let max_polls = parse_u32("ORDERSYNC_MAX_POLLS", "40")?;
    let request_timeout_secs = parse_u64("ORDERSYNC_REQUEST_TIMEOUT_SECS", "30")?;

    Ok(AppConfig {
        access_key,
        secret_key,
        seller_id,
        api_base_url,
        database_url,
        report_type,
        window_days,
        poll_interval_secs,
        retry_backoff_secs,
        max_transient_retries,
        max_polls,
        request_timeout_secs,
    })
}
