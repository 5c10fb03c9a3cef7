//! connstat
//!
//! Samples connectivity quality to a single URL: issues a bounded number of
//! sequential HTTP requests, collects DNS lookup, connect, first-byte and total
//! times from the transport engine, and reports the median of each metric with
//! the resolved server IP and HTTP status code as one `SKTEST;...` line.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod dns;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod session;
pub mod stats;
pub mod trace;

// Re-export commonly used types
pub use client::{ReqwestEngine, TransferInfo, TransferOptions, TransportEngine};
pub use config::validation::{validate_header, validate_request};
pub use error::{AppError, Result};
pub use models::{Config, HeaderEntry, HeaderPolicy, RequestConfig, SampleSet, StatisticsReport};
pub use output::{ReportFormat, ReportFormatter};
pub use session::{SessionController, SessionOptions, SessionState};
pub use stats::{median, median_in_place};
pub use trace::{DiscardSink, ResponseSink, TraceEvent, TraceSink};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Bounds enforced by the validators
pub mod limits {
    /// Maximum number of request executions per trigger (sample buffer capacity)
    pub const MAX_SAMPLES: usize = 16;
    pub const URL_MIN_LEN: usize = 5;
    pub const URL_MAX_LEN: usize = 64;
    pub const HEADER_MIN_LEN: usize = 3;
    pub const HEADER_MAX_LEN: usize = 256;
    /// Redirect hops followed per execution
    pub const MAX_REDIRECTS: usize = 10;
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_REPEAT_COUNT: u32 = 1;
    pub const DEFAULT_URL: &str = "http://www.google.com/";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const DEFAULT_USER_AGENT: &str = concat!("connstat/", env!("CARGO_PKG_VERSION"));
}
