//! Report rendering
//!
//! The default rendering is the single `SKTEST;...` line consumed by scripts;
//! a JSON rendering of the same report is available for other tooling.

use crate::{
    error::{AppError, Result},
    models::StatisticsReport,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leading tag of the report line
pub const REPORT_TAG: &str = "SKTEST";

/// How a statistics report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `SKTEST;<ip>;<status>;<lookup>;<connect>;<start>;<total>`
    #[default]
    Sktest,
    /// The report as a JSON object
    Json,
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sktest" => Ok(ReportFormat::Sktest),
            "json" => Ok(ReportFormat::Json),
            _ => Err(AppError::argument_parsing(format!(
                "Invalid report format '{}' (expected sktest or json)",
                s
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Sktest => write!(f, "sktest"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Renders statistics reports in the selected format
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    format: ReportFormat,
}

impl ReportFormatter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn render(&self, report: &StatisticsReport) -> Result<String> {
        match self.format {
            ReportFormat::Sktest => Ok(Self::sktest_line(report)),
            ReportFormat::Json => serde_json::to_string(report)
                .map_err(|e| AppError::internal(format!("Failed to serialize report: {}", e))),
        }
    }

    /// The report line, medians in seconds with six decimals
    pub fn sktest_line(report: &StatisticsReport) -> String {
        format!(
            "{};{};{};{:.6};{:.6};{:.6};{:.6}",
            REPORT_TAG,
            report.resolved_ip,
            report.status_code,
            report.median_name_lookup,
            report.median_connect,
            report.median_start_transfer,
            report.median_total
        )
    }
}
