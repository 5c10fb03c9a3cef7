//! Transport engine abstraction and the reqwest-based implementation

pub mod engine;


pub use engine::ReqwestEngine;

use crate::{
    error::Result,
    models::{metrics::TimingSample, HeaderEntry},
    trace::{ResponseSink, TraceSink},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A blocking HTTP transfer engine driven by the session controller.
///
/// One engine performs one execution at a time. After a successful
/// [`perform`](TransportEngine::perform), [`transfer_info`](TransportEngine::transfer_info)
/// describes that execution.
pub trait TransportEngine {
    /// Acquire whatever the engine needs before the first execution
    fn start(&mut self) -> Result<()>;

    /// Set the options used by subsequent executions
    fn configure(&mut self, options: TransferOptions) -> Result<()>;

    /// Run one execution, streaming the body into `body` and protocol
    /// events into `trace`
    fn perform(&mut self, body: &mut dyn ResponseSink, trace: &mut dyn TraceSink) -> Result<()>;

    /// Metrics of the last completed execution
    fn transfer_info(&self) -> Result<TransferInfo>;

    /// Release everything acquired by `start`; safe to call repeatedly
    fn shutdown(&mut self);
}

/// Options applied to every execution of a trigger
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOptions {
    pub url: String,
    pub follow_redirects: bool,
    /// Extra headers, sent in order; duplicates are kept
    pub headers: Vec<HeaderEntry>,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl TransferOptions {
    /// Options for `url` with redirects followed and no extra headers
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            follow_redirects: true,
            headers: Vec::new(),
            user_agent: crate::defaults::DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: Vec<HeaderEntry>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What the engine reports about one completed execution.
///
/// Times are cumulative seconds since the start of the execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferInfo {
    pub timing: TimingSample,
    /// Address of the server that was connected to
    pub primary_ip: String,
    pub response_code: u16,
}
