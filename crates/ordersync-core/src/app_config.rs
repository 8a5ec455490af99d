/// Runtime configuration for one pipeline run, read from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub access_key: String,
    pub secret_key: String,
    pub seller_id: String,
    pub api_base_url: String,
    pub database_url: String,
    pub report_type: String,
    pub window_days: u32,
    pub poll_interval_secs: u64,
    pub retry_backoff_secs: u64,
    pub max_transient_retries: u32,
    pub max_polls: u32,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("access_key", &"[redacted]")
            .field("secret_key", &"[redacted]")
            .field("seller_id", &self.seller_id)
            .field("api_base_url", &self.api_base_url)
            .field("database_url", &self.database_url)
            .field("report_type", &self.report_type)
            .field("window_days", &self.window_days)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("retry_backoff_secs", &self.retry_backoff_secs)
            .field("max_transient_retries", &self.max_transient_retries)
            .field("max_polls", &self.max_polls)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
