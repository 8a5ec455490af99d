use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod app_config;
pub mod config;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

/// One normalized sale line extracted from an order report.
///
/// `(order_id, sku)` identifies the same physical order line across runs
/// with overlapping windows; the store treats a repeated pair as a no-op.
/// `purchase_date` is the ISO-8601 timestamp as reported by the remote
/// service, stored verbatim and not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub order_id: String,
    pub purchase_date: String,
    pub sku: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
