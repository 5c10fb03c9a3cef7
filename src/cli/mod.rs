//! Command-line interface

use crate::{
    error::AppError,
    limits::URL_MAX_LEN,
    logging::LogFormat,
    models::HeaderPolicy,
    output::ReportFormat,
};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("CONNSTAT_BUILD_TIME"),
    " for ",
    env!("CONNSTAT_TARGET"),
    ")"
);

/// connstat - sample HTTP connectivity to a URL and report median timings
#[derive(Parser, Debug, Clone)]
#[command(name = "connstat")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Number of HTTP requests to make (accepted range is checked before sending: 1-16)
    #[arg(short = 'n', long = "count", value_name = "N")]
    pub count: Option<u32>,

    /// Target URL (at most 64 characters)
    #[arg(short = 'u', long = "url", value_name = "URL", value_parser = parse_url_arg)]
    pub url: Option<String>,

    /// Extra request header in "Name: Value" form (can be used multiple times)
    ///
    /// Any text of 3-256 characters containing a colon is accepted here. A name
    /// that is not a legal HTTP header name (for example ":abc") makes the
    /// request fail with a transport error.
    #[arg(short = 'H', long = "header", value_name = "HEADER", action = ArgAction::Append)]
    pub headers: Vec<String>,

    /// Write raw headers, body and a protocol trace into this directory
    #[arg(long, value_name = "DIR")]
    pub trace_dir: Option<PathBuf>,

    /// Whether extra headers persist across triggers (persist, reset)
    #[arg(long, value_name = "POLICY", value_parser = parse_header_policy)]
    pub header_policy: Option<HeaderPolicy>,

    /// Report format (sktest, json)
    #[arg(long = "format", value_name = "FORMAT", value_parser = parse_report_format)]
    pub format: Option<ReportFormat>,

    /// Per-request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Log progress and per-request samples to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Log format override (console, json, compact)
    #[arg(long, value_name = "FORMAT", value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color
    }

    /// Build details for debug output
    pub fn build_info() -> String {
        match option_env!("CONNSTAT_GIT_COMMIT") {
            Some(commit) => format!("{} commit {}", LONG_VERSION, commit),
            None => LONG_VERSION.to_string(),
        }
    }
}

/// Reject over-long URLs while parsing, before anything is sent
fn parse_url_arg(value: &str) -> Result<String, String> {
    if value.len() > URL_MAX_LEN {
        return Err(format!(
            "Requested URL is too long ({}>{})",
            value.len(),
            URL_MAX_LEN
        ));
    }
    Ok(value.to_string())
}

fn parse_header_policy(value: &str) -> Result<HeaderPolicy, String> {
    value.parse().map_err(|e: AppError| e.to_string())
}

fn parse_report_format(value: &str) -> Result<ReportFormat, String> {
    value.parse().map_err(|e: AppError| e.to_string())
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse().map_err(|e: AppError| e.to_string())
}
