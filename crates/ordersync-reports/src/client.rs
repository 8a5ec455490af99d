//! HTTP client for the marketplace reporting service.
//!
//! Wraps `reqwest` with credential headers, typed response deserialization,
//! and explicit status mapping: 401/403 become [`ReportsError::Auth`], other
//! non-2xx statuses become [`ReportsError::UnexpectedStatus`]. Each method
//! performs exactly one remote call; retry policy lives in [`crate::poller`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};

use crate::error::ReportsError;
use crate::types::{CreateReportRequest, CreateReportResponse, ReportStatus};

const ACCESS_KEY_HEADER: &str = "x-marketplace-access-key";
const SECRET_KEY_HEADER: &str = "x-marketplace-secret-key";

/// Client for the marketplace reports API.
///
/// Holds the pre-authenticated HTTP client, the seller identity, and the
/// base URL. The base URL is a constructor input so tests can point the
/// client at a wiremock server.
pub struct ReportsClient {
    client: Client,
    seller_id: String,
    base_url: Url,
}

impl ReportsClient {
    /// Creates a client with the given credentials, request timeout, and base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ReportsError::Api`] if the base URL or a
    /// credential is not representable in a request.
    pub fn new(
        access_key: &str,
        secret_key: &str,
        seller_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ReportsError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY_HEADER, header_value(ACCESS_KEY_HEADER, access_key)?);
        headers.insert(SECRET_KEY_HEADER, header_value(SECRET_KEY_HEADER, secret_key)?);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ordersync/0.1 (order-report-sync)")
            .default_headers(headers)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joined endpoint paths land under the root rather than replacing the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ReportsError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            seller_id: seller_id.to_owned(),
            base_url,
        })
    }

    /// Submits a report generation request for the given window.
    ///
    /// Calls `POST /reports` and returns the service-assigned request id.
    ///
    /// # Errors
    ///
    /// - [`ReportsError::Auth`] if the credentials are rejected.
    /// - [`ReportsError::Http`] / [`ReportsError::UnexpectedStatus`] on
    ///   network failure or a non-2xx status.
    /// - [`ReportsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn create_report(
        &self,
        report_type: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<String, ReportsError> {
        let url = self.endpoint(&["reports"]);
        let body = CreateReportRequest {
            report_type,
            seller_id: &self.seller_id,
            data_start_time: window_start.to_rfc3339(),
            data_end_time: window_end.to_rfc3339(),
        };

        let response = self.client.post(url.clone()).json(&body).send().await?;
        let body = Self::check_status(response, &url).await?.text().await?;

        let parsed: CreateReportResponse =
            serde_json::from_str(&body).map_err(|e| ReportsError::Deserialize {
                context: format!("createReport({report_type})"),
                source: e,
            })?;

        Ok(parsed.report_request_id)
    }

    /// Queries the processing status of a generation request.
    ///
    /// Calls `GET /reports/{id}`. The returned envelope carries a document id
    /// only once the status is `DONE`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`ReportsClient::create_report`].
    pub async fn get_report_status(&self, request_id: &str) -> Result<ReportStatus, ReportsError> {
        let url = self.endpoint(&["reports", request_id]);

        let response = self.client.get(url.clone()).send().await?;
        let body = Self::check_status(response, &url).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| ReportsError::Deserialize {
            context: format!("getReportStatus({request_id})"),
            source: e,
        })
    }

    /// Downloads a completed report document as raw text.
    ///
    /// Calls `GET /documents/{id}` and returns the body verbatim; the XML is
    /// interpreted by [`crate::parser::parse_order_report`].
    ///
    /// # Errors
    ///
    /// - [`ReportsError::Auth`] if the credentials are rejected.
    /// - [`ReportsError::Http`] / [`ReportsError::UnexpectedStatus`] on
    ///   network failure or a non-2xx status.
    pub async fn get_report_document(&self, document_id: &str) -> Result<String, ReportsError> {
        let url = self.endpoint(&["documents", document_id]);

        let response = self.client.get(url.clone()).send().await?;
        let body = Self::check_status(response, &url).await?.text().await?;
        Ok(body)
    }

    /// Builds the full request URL for the given path segments.
    ///
    /// Segments are pushed via [`Url::path_segments_mut`] so that opaque ids
    /// are percent-encoded rather than spliced into the path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    /// Maps the HTTP status to the error taxonomy and passes 2xx through.
    async fn check_status(response: Response, url: &Url) -> Result<Response, ReportsError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            return Err(ReportsError::Auth {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(ReportsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ReportsError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| ReportsError::Api(format!("credential is not a valid {name} header: {e}")))?;
    header.set_sensitive(true);
    Ok(header)
}
