use serde::{Deserialize, Serialize};

/// Remote-side processing state of a report generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Submitted,
    InProgress,
    Done,
    Cancelled,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Submitted => write!(f, "SUBMITTED"),
            ProcessingStatus::InProgress => write!(f, "IN_PROGRESS"),
            ProcessingStatus::Done => write!(f, "DONE"),
            ProcessingStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Status envelope returned by `GET /reports/{id}`.
///
/// `report_document_id` is populated by the service only once
/// `processing_status` is [`ProcessingStatus::Done`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatus {
    pub report_request_id: String,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub report_document_id: Option<String>,
}

/// Body for `POST /reports`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateReportRequest<'a> {
    pub report_type: &'a str,
    pub seller_id: &'a str,
    pub data_start_time: String,
    pub data_end_time: String,
}

/// Response envelope for `POST /reports`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateReportResponse {
    pub report_request_id: String,
}
