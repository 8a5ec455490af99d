pub mod client;
pub mod error;
pub mod parser;
pub mod poller;
pub mod types;


pub use client::ReportsClient;
pub use error::ReportsError;
pub use parser::parse_order_report;
pub use poller::{poll_for_report, PollPolicy, Sleep, TokioSleep};
pub use types::{ProcessingStatus, ReportStatus};
