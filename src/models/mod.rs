//! Data models for connstat

pub mod config;
pub mod metrics;
pub mod request;

// Re-export main model types
pub use config::Config;
pub use metrics::{Metric, SampleSet, StatisticsReport, TimingSample};
pub use request::{HeaderEntry, HeaderPolicy, RequestConfig};
