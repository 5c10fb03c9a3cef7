//! Configuration data model

use crate::error::{AppError, Result};
use crate::logging::LogFormat;
use crate::models::request::{HeaderPolicy, RequestConfig};
use crate::output::ReportFormat;
use crate::session::SessionOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration, assembled from defaults, environment and CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of request executions per trigger
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,

    /// Target URL
    #[serde(default = "default_url")]
    pub target_url: String,

    /// Extra request headers in "Name: Value" form, in the order given
    #[serde(default)]
    pub headers: Vec<String>,

    /// Directory receiving raw headers, body and protocol trace
    #[serde(default)]
    pub trace_dir: Option<PathBuf>,

    /// Whether headers persist across triggers
    #[serde(default)]
    pub header_policy: HeaderPolicy,

    /// How the final report is rendered
    #[serde(default)]
    pub report_format: ReportFormat,

    /// Per-execution timeout; none by default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Log format override
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repeat_count: default_repeat_count(),
            target_url: default_url(),
            headers: Vec::new(),
            trace_dir: None,
            header_policy: HeaderPolicy::default(),
            report_format: ReportFormat::default(),
            timeout_seconds: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
            log_format: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-execution timeout as Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Checks done while parsing arguments.
    ///
    /// Only the URL upper length bound is enforced here; the repeat count and
    /// the remaining URL rules are left to the request validator at trigger time.
    pub fn validate(&self) -> Result<()> {
        if self.target_url.len() > crate::limits::URL_MAX_LEN {
            return Err(AppError::argument_parsing(format!(
                "Requested URL is too long ({}>{})",
                self.target_url.len(),
                crate::limits::URL_MAX_LEN
            )));
        }

        if self.timeout_seconds == Some(0) {
            return Err(AppError::argument_parsing("Timeout must be greater than 0"));
        }

        Ok(())
    }

    /// The request a trigger should perform
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig::new(self.repeat_count, self.target_url.clone())
    }

    /// Session-level options derived from this configuration
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            trace_dir: self.trace_dir.clone(),
            header_policy: self.header_policy,
            timeout: self.timeout(),
        }
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(count) = std::env::var("CONNSTAT_COUNT") {
            self.repeat_count = count.trim().parse().map_err(|e| {
                AppError::argument_parsing(format!("Invalid CONNSTAT_COUNT value '{}': {}", count, e))
            })?;
        }

        if let Ok(url) = std::env::var("CONNSTAT_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.target_url = url.to_string();
            }
        }

        if let Ok(trace_dir) = std::env::var("CONNSTAT_TRACE_DIR") {
            let trace_dir = trace_dir.trim();
            if !trace_dir.is_empty() {
                self.trace_dir = Some(PathBuf::from(trace_dir));
            }
        }

        if let Ok(policy) = std::env::var("CONNSTAT_HEADER_POLICY") {
            self.header_policy = policy.parse()?;
        }

        if let Ok(timeout) = std::env::var("CONNSTAT_TIMEOUT") {
            let seconds: u64 = timeout.trim().parse().map_err(|e| {
                AppError::argument_parsing(format!("Invalid CONNSTAT_TIMEOUT value '{}': {}", timeout, e))
            })?;
            self.timeout_seconds = Some(seconds);
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_repeat_count() -> u32 {
    crate::defaults::DEFAULT_REPEAT_COUNT
}

fn default_url() -> String {
    crate::defaults::DEFAULT_URL.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
