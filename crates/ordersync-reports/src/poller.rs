//! Bounded poll loop that drives a report request to completion.
//!
//! [`poll_for_report`] wraps any fallible async status source and keeps
//! polling while the request is `SUBMITTED` or `IN_PROGRESS`. Transient
//! errors (network failures, 5xx) are retried after a fixed back-off up to a
//! configured ceiling; non-transient errors — authentication rejections,
//! malformed envelopes — are returned immediately without any retry.
//!
//! Waits go through the [`Sleep`] trait rather than ambient `tokio::time::sleep`
//! so the loop is deterministic under test.

use std::future::Future;
use std::time::Duration;

use crate::error::ReportsError;
use crate::types::{ProcessingStatus, ReportStatus};

/// Poll and back-off parameters, populated from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Wait between status polls while the report is still generating.
    pub poll_interval: Duration,
    /// Fixed wait before retrying after a transient failure.
    pub retry_backoff: Duration,
    /// Transient failures tolerated before giving up. The ceiling is
    /// cumulative across the whole loop; exceeding it is terminal.
    pub max_transient_retries: u32,
    /// Hard cap on status calls; exceeding it is a timeout.
    pub max_polls: u32,
}

/// Injectable wait strategy for the poll loop.
pub trait Sleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production [`Sleep`] that suspends on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Polls `status_fn` until the request reaches a terminal state.
///
/// Returns the generated report document id once the status is `DONE`.
///
/// # Errors
///
/// - [`ReportsError::ReportCancelled`] if the service cancels the request.
/// - [`ReportsError::RetriesExhausted`] once transient failures exceed
///   `policy.max_transient_retries`; carries the last underlying error.
/// - [`ReportsError::PollTimeout`] once `policy.max_polls` status calls have
///   been made without reaching a terminal state.
/// - Any non-transient error from `status_fn`, immediately and unretried.
/// - [`ReportsError::Api`] if the service reports `DONE` without a document id.
pub async fn poll_for_report<S, F, Fut>(
    policy: &PollPolicy,
    sleeper: &S,
    request_id: &str,
    mut status_fn: F,
) -> Result<String, ReportsError>
where
    S: Sleep,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ReportStatus, ReportsError>>,
{
    let mut transient_failures = 0u32;
    let mut polls = 0u32;

    loop {
        if polls >= policy.max_polls {
            return Err(ReportsError::PollTimeout { polls });
        }
        polls += 1;

        match status_fn().await {
            Ok(status) => match status.processing_status {
                ProcessingStatus::Done => {
                    return status.report_document_id.ok_or_else(|| {
                        ReportsError::Api(format!(
                            "request {request_id} reported DONE without a document id"
                        ))
                    });
                }
                ProcessingStatus::Submitted | ProcessingStatus::InProgress => {
                    tracing::debug!(
                        request_id,
                        polls,
                        status = %status.processing_status,
                        "report not ready; waiting before next poll"
                    );
                    sleeper.sleep(policy.poll_interval).await;
                }
                ProcessingStatus::Cancelled => {
                    return Err(ReportsError::ReportCancelled {
                        request_id: request_id.to_owned(),
                    });
                }
            },
            Err(err) => {
                if !err.is_transient() {
                    return Err(err);
                }
                transient_failures += 1;
                if transient_failures > policy.max_transient_retries {
                    return Err(ReportsError::RetriesExhausted {
                        attempts: transient_failures,
                        source: Box::new(err),
                    });
                }
                tracing::warn!(
                    request_id,
                    attempt = transient_failures,
                    max_retries = policy.max_transient_retries,
                    error = %err,
                    "transient status failure — retrying after back-off"
                );
                sleeper.sleep(policy.retry_backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// No-op sleeper that records every requested wait.
    #[derive(Default)]
    struct RecordingSleep {
        waits: Mutex<Vec<Duration>>,
    }

    impl Sleep for RecordingSleep {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            self.waits.lock().unwrap().push(duration);
            std::future::ready(())
        }
    }

    fn test_policy() -> PollPolicy {
        PollPolicy {
            poll_interval: Duration::from_millis(30),
            retry_backoff: Duration::from_millis(10),
            max_transient_retries: 3,
            max_polls: 40,
        }
    }

    fn status(processing_status: ProcessingStatus, document_id: Option<&str>) -> ReportStatus {
        ReportStatus {
            report_request_id: "REQ1".to_owned(),
            processing_status,
            report_document_id: document_id.map(str::to_owned),
        }
    }

    fn transient_err() -> ReportsError {
        ReportsError::UnexpectedStatus {
            status: 503,
            url: "https://reports.example.test/reports/REQ1".to_owned(),
        }
    }

    #[tokio::test]
    async fn returns_document_id_after_exactly_four_polls() {
        let sequence = [
            ProcessingStatus::Submitted,
            ProcessingStatus::InProgress,
            ProcessingStatus::InProgress,
            ProcessingStatus::Done,
        ];
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let sleeper = RecordingSleep::default();

        let result = poll_for_report(&test_policy(), &sleeper, "REQ1", || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) as usize;
                let s = sequence[n];
                let doc = (s == ProcessingStatus::Done).then_some("RPT1");
                Ok(status(s, doc))
            }
        })
        .await;

        assert_eq!(result.unwrap(), "RPT1");
        assert_eq!(calls.load(Ordering::SeqCst), 4, "expected exactly 4 polls");
        let waits = sleeper.waits.lock().unwrap();
        assert_eq!(waits.len(), 3, "one wait between each non-terminal poll");
        assert!(waits.iter().all(|w| *w == Duration::from_millis(30)));
    }

    #[tokio::test]
    async fn exhausts_retries_on_the_fourth_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let sleeper = RecordingSleep::default();

        let result = poll_for_report(&test_policy(), &sleeper, "REQ1", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<ReportStatus, _>(transient_err())
            }
        })
        .await;

        assert_eq!(
            calls.load(Ordering::SeqCst),
            4,
            "ceiling of 3 allows the initial attempt plus 3 retries"
        );
        match result {
            Err(ReportsError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("expected RetriesExhausted, got: {other:?}"),
        }
        // The terminal failure itself is not followed by a wait.
        assert_eq!(sleeper.waits.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn transient_failure_then_done_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let sleeper = RecordingSleep::default();

        let result = poll_for_report(&test_policy(), &sleeper, "REQ1", || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(transient_err())
                } else {
                    Ok(status(ProcessingStatus::Done, Some("RPT1")))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "RPT1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_status_is_terminal() {
        let sleeper = RecordingSleep::default();
        let result = poll_for_report(&test_policy(), &sleeper, "REQ1", || async {
            Ok(status(ProcessingStatus::Cancelled, None))
        })
        .await;

        assert!(
            matches!(result, Err(ReportsError::ReportCancelled { ref request_id }) if request_id == "REQ1")
        );
        assert!(sleeper.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn auth_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let sleeper = RecordingSleep::default();

        let result = poll_for_report(&test_policy(), &sleeper, "REQ1", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<ReportStatus, _>(ReportsError::Auth {
                    status: 401,
                    message: "bad key".to_owned(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1, "auth must not be retried");
        assert!(matches!(result, Err(ReportsError::Auth { .. })));
        assert!(sleeper.waits.lock().unwrap().is_empty(), "no retry wait");
    }

    #[tokio::test]
    async fn times_out_at_the_poll_cap() {
        let policy = PollPolicy {
            max_polls: 5,
            ..test_policy()
        };
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let sleeper = RecordingSleep::default();

        let result = poll_for_report(&policy, &sleeper, "REQ1", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(status(ProcessingStatus::InProgress, None))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(matches!(result, Err(ReportsError::PollTimeout { polls: 5 })));
    }

    #[tokio::test]
    async fn done_without_document_id_is_an_api_error() {
        let sleeper = RecordingSleep::default();
        let result = poll_for_report(&test_policy(), &sleeper, "REQ1", || async {
            Ok(status(ProcessingStatus::Done, None))
        })
        .await;

        assert!(matches!(result, Err(ReportsError::Api(_))));
    }
}
