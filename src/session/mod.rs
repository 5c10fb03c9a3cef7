//! Session controller: owns the transport engine, the extra headers and the
//! latest statistics report, and runs sampling triggers.

pub mod state;

pub use state::SessionState;

use crate::{
    client::{TransferOptions, TransportEngine},
    config::validation::validate_request,
    error::{AppError, Result},
    logging::SessionLogger,
    models::{HeaderEntry, HeaderPolicy, RequestConfig, StatisticsReport},
    output::{ReportFormat, ReportFormatter},
    stats::SampleCollector,
    trace::{DiscardSink, ResponseSink, TraceDirectory, TraceSink},
};
use std::path::PathBuf;
use std::time::Duration;

/// Session-wide settings fixed at construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    /// Directory for raw headers, body and protocol trace; none disables tracing
    pub trace_dir: Option<PathBuf>,
    pub header_policy: HeaderPolicy,
    /// Per-execution timeout; none means wait indefinitely
    pub timeout: Option<Duration>,
}

/// Drives one transport engine through init, triggers and close.
///
/// Single-threaded; every call blocks until the engine is done.
pub struct SessionController<E: TransportEngine> {
    engine: E,
    options: SessionOptions,
    state: SessionState,
    headers: Vec<HeaderEntry>,
    report: Option<StatisticsReport>,
    formatter: ReportFormatter,
    body_sink: Option<Box<dyn ResponseSink>>,
    trace_sink: Option<Box<dyn TraceSink>>,
    logger: SessionLogger,
}

impl<E: TransportEngine> SessionController<E> {
    pub fn new(engine: E, options: SessionOptions) -> Self {
        Self {
            engine,
            options,
            state: SessionState::Uninitialized,
            headers: Vec::new(),
            report: None,
            formatter: ReportFormatter::default(),
            body_sink: None,
            trace_sink: None,
            logger: SessionLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: SessionLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.formatter = ReportFormatter::new(format);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Extra headers that the next trigger will send
    pub fn headers(&self) -> &[HeaderEntry] {
        &self.headers
    }

    pub fn report(&self) -> Option<&StatisticsReport> {
        self.report.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Start the engine and open trace sinks.
    ///
    /// On failure the session stays `Uninitialized`; whatever was acquired is
    /// released by `close`.
    pub fn init(&mut self) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(AppError::invalid_state(format!(
                "init called in state {}",
                self.state
            )));
        }

        self.engine.start()?;

        if let Some(dir) = &self.options.trace_dir {
            let (body, trace) = TraceDirectory::open(dir)?;
            self.body_sink = Some(Box::new(body));
            self.trace_sink = Some(Box::new(trace));
        }

        self.transition(SessionState::Initialized);
        Ok(())
    }

    /// Validate and append an extra header. Duplicates are kept.
    pub fn add_header(&mut self, text: &str) -> Result<()> {
        self.ensure_active("add_header")?;

        let entry = HeaderEntry::parse(text)?;
        self.headers.push(entry);
        self.logger.log_header_added(text, self.headers.len());
        Ok(())
    }

    /// Run `config.repeat_count` sequential executions and store the
    /// resulting report.
    ///
    /// Nothing reaches the engine when validation fails. Any failed execution
    /// aborts the trigger without a report.
    pub fn trigger(&mut self, config: &RequestConfig) -> Result<()> {
        self.ensure_active("trigger")?;
        validate_request(config)?;

        self.report = None;
        let result = self.run_executions(config);

        if self.options.header_policy == HeaderPolicy::ResetAfterTrigger {
            self.headers.clear();
        }

        self.report = Some(result?);
        self.transition(SessionState::Triggered);
        Ok(())
    }

    fn run_executions(&mut self, config: &RequestConfig) -> Result<StatisticsReport> {
        let correlation_id = self
            .logger
            .log_trigger_start(&config.target_url, config.repeat_count);

        let options = TransferOptions::new(config.target_url.as_str())
            .with_headers(self.headers.clone())
            .with_timeout(self.options.timeout);
        self.engine.configure(options)?;

        let mut collector = SampleCollector::new();
        let mut discard_body = DiscardSink;
        let mut discard_trace = DiscardSink;

        for index in 0..config.repeat_count as usize {
            let body: &mut dyn ResponseSink = match self.body_sink.as_deref_mut() {
                Some(sink) => sink,
                None => &mut discard_body,
            };
            let trace: &mut dyn TraceSink = match self.trace_sink.as_deref_mut() {
                Some(sink) => sink,
                None => &mut discard_trace,
            };

            if let Err(error) = self.engine.perform(body, trace) {
                self.logger.log_transfer_failure(index, &error, &correlation_id);
                return Err(error);
            }

            let info = self.engine.transfer_info()?;
            self.logger.log_sample(index, &info.timing, &correlation_id);
            collector.record(info)?;
        }

        let report = collector.finish()?;
        self.logger.log_report(&report, &correlation_id);
        Ok(report)
    }

    /// The latest report, rendered in the session's report format
    pub fn get_statistics(&self) -> Result<String> {
        match &self.report {
            Some(report) => self.formatter.render(report),
            None => Err(AppError::result_before_trigger(
                "no trigger has completed successfully",
            )),
        }
    }

    /// Flush and release sinks, headers and the engine.
    ///
    /// Repeatable. The report stays readable afterwards. A flush failure is
    /// returned once everything has been released.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        let mut first_error = None;
        if let Some(mut body) = self.body_sink.take() {
            if let Err(error) = body.flush() {
                first_error.get_or_insert(error);
            }
        }
        if let Some(mut trace) = self.trace_sink.take() {
            if let Err(error) = trace.flush() {
                first_error.get_or_insert(error);
            }
        }

        self.headers.clear();
        self.engine.shutdown();
        self.transition(SessionState::Closed);

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn ensure_active(&self, operation: &str) -> Result<()> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(AppError::invalid_state(format!(
                "{} called in state {}",
                operation, self.state
            )))
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            self.logger
                .log_state_change(self.state.as_str(), next.as_str());
            self.state = next;
        }
    }
}

impl<E: TransportEngine> Drop for SessionController<E> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            self.logger.log_error(&error, Some("closing session on drop"));
        }
    }
}
