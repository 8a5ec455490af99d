use thiserror::Error;

/// Errors returned by the reporting-service client, poll loop, and parser.
#[derive(Debug, Error)]
pub enum ReportsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The reporting service rejected the supplied credentials (HTTP 401/403).
    #[error("authentication rejected by reporting service (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// Non-2xx HTTP status that is not an authentication failure.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Application-level error from the reporting service.
    #[error("reporting service error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The report document is not well-formed XML.
    #[error("XML parse error in report document: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The report document parsed as XML but a required field is missing.
    #[error("malformed order report: {reason}")]
    MalformedReport { reason: String },

    /// The reporting service cancelled the generation request.
    #[error("report request {request_id} was cancelled by the reporting service")]
    ReportCancelled { request_id: String },

    /// The poll loop hit its transient-failure ceiling.
    #[error("gave up polling after {attempts} transient failures: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ReportsError>,
    },

    /// The report was still not generated after the configured poll cap.
    #[error("report was not ready after {polls} status polls")]
    PollTimeout { polls: u32 },
}

impl ReportsError {
    /// Returns `true` for errors that are worth retrying after a back-off delay.
    ///
    /// **Retriable:**
    /// - Network-level failures: timeout, connection reset.
    /// - HTTP 5xx responses: transient server/infrastructure errors.
    ///
    /// **Not retriable (hard stop):**
    /// - [`ReportsError::Auth`] — the credentials are wrong; retrying won't fix it.
    /// - [`ReportsError::Deserialize`] / [`ReportsError::MalformedReport`] —
    ///   malformed response; retrying won't fix it.
    /// - All terminal poll outcomes and application-level errors.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ReportsError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ReportsError::UnexpectedStatus { status, .. } => *status >= 500,
            ReportsError::Auth { .. }
            | ReportsError::Api(_)
            | ReportsError::Deserialize { .. }
            | ReportsError::Xml(_)
            | ReportsError::MalformedReport { .. }
            | ReportsError::ReportCancelled { .. }
            | ReportsError::RetriesExhausted { .. }
            | ReportsError::PollTimeout { .. } => false,
        }
    }
}
