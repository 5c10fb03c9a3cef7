//! Request configuration and header models

use crate::config::validation::validate_header;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a trigger should do against which URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Number of sequential request executions
    pub repeat_count: u32,
    /// Target URL, empty when absent
    pub target_url: String,
}

impl RequestConfig {
    pub fn new<S: Into<String>>(repeat_count: u32, target_url: S) -> Self {
        Self {
            repeat_count,
            target_url: target_url.into(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new(
            crate::defaults::DEFAULT_REPEAT_COUNT,
            crate::defaults::DEFAULT_URL,
        )
    }
}

/// A validated extra request header in `"Name: Value"` form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry(String);

impl HeaderEntry {
    /// Validate `text` and wrap it
    pub fn parse(text: &str) -> Result<Self> {
        validate_header(Some(text))?;
        Ok(Self(text.to_string()))
    }

    /// The header exactly as supplied
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split at the first colon; both halves trimmed
    pub fn name_value(&self) -> (&str, &str) {
        match self.0.split_once(':') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (self.0.trim(), ""),
        }
    }
}

impl fmt::Display for HeaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether accumulated headers survive from one trigger to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    /// Headers accumulate for the lifetime of the session
    #[default]
    Persist,
    /// Headers are cleared once a trigger has reached the transport
    ResetAfterTrigger,
}

impl FromStr for HeaderPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "persist" => Ok(HeaderPolicy::Persist),
            "reset" | "reset-after-trigger" => Ok(HeaderPolicy::ResetAfterTrigger),
            other => Err(AppError::argument_parsing(format!(
                "Invalid header policy '{}' (expected 'persist' or 'reset')",
                other
            ))),
        }
    }
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderPolicy::Persist => f.write_str("persist"),
            HeaderPolicy::ResetAfterTrigger => f.write_str("reset"),
        }
    }
}
