//! End-to-end session tests against a scripted transport engine
//!
//! These exercise the public session and application API without any
//! network access.

use connstat::{
    app::App,
    models::metrics::TimingSample,
    AppError, Config, HeaderPolicy, RequestConfig, ResponseSink, Result, SessionController,
    SessionOptions, SessionState, TraceSink, TransferInfo, TransferOptions, TransportEngine,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// What the scripted engine saw, shared with the test after the engine moved
#[derive(Debug, Default)]
struct EngineLog {
    starts: usize,
    configured: Vec<TransferOptions>,
    performed: usize,
    shutdowns: usize,
}

struct ScriptedEngine {
    script: VecDeque<Result<TransferInfo>>,
    last: Option<TransferInfo>,
    log: Rc<RefCell<EngineLog>>,
}

impl ScriptedEngine {
    fn new(script: Vec<Result<TransferInfo>>) -> (Self, Rc<RefCell<EngineLog>>) {
        let log = Rc::new(RefCell::new(EngineLog::default()));
        let engine = Self {
            script: script.into(),
            last: None,
            log: Rc::clone(&log),
        };
        (engine, log)
    }
}

impl TransportEngine for ScriptedEngine {
    fn start(&mut self) -> Result<()> {
        self.log.borrow_mut().starts += 1;
        Ok(())
    }

    fn configure(&mut self, options: TransferOptions) -> Result<()> {
        self.log.borrow_mut().configured.push(options);
        Ok(())
    }

    fn perform(&mut self, _body: &mut dyn ResponseSink, _trace: &mut dyn TraceSink) -> Result<()> {
        self.log.borrow_mut().performed += 1;
        match self.script.pop_front() {
            Some(Ok(info)) => {
                self.last = Some(info);
                Ok(())
            }
            Some(Err(error)) => Err(error),
            None => Err(AppError::transport("script exhausted")),
        }
    }

    fn transfer_info(&self) -> Result<TransferInfo> {
        self.last
            .clone()
            .ok_or_else(|| AppError::transport("nothing performed"))
    }

    fn shutdown(&mut self) {
        self.log.borrow_mut().shutdowns += 1;
    }
}

fn sample(ip: &str, status: u16, timing: (f64, f64, f64, f64)) -> Result<TransferInfo> {
    Ok(TransferInfo {
        timing: TimingSample::new(timing.0, timing.1, timing.2, timing.3),
        primary_ip: ip.to_string(),
        response_code: status,
    })
}

fn three_samples() -> Vec<Result<TransferInfo>> {
    vec![
        sample("93.184.216.34", 200, (0.010, 0.030, 0.100, 0.200)),
        sample("93.184.216.34", 200, (0.020, 0.020, 0.300, 0.100)),
        sample("93.184.216.34", 200, (0.015, 0.040, 0.200, 0.300)),
    ]
}

#[test]
fn test_three_executions_produce_exact_report_line() {
    let (engine, log) = ScriptedEngine::new(three_samples());
    let mut session = SessionController::new(engine, SessionOptions::default());

    session.init().unwrap();
    session
        .trigger(&RequestConfig::new(3, "http://example.com/"))
        .unwrap();
    session.close().unwrap();

    assert_eq!(
        session.get_statistics().unwrap(),
        "SKTEST;93.184.216.34;200;0.015000;0.030000;0.200000;0.200000"
    );
    let log = log.borrow();
    assert_eq!(log.performed, 3);
    assert_eq!(log.configured.len(), 1);
    assert_eq!(log.configured[0].url, "http://example.com/");
}

#[test]
fn test_statistics_before_any_trigger() {
    let (engine, _log) = ScriptedEngine::new(vec![]);
    let mut session = SessionController::new(engine, SessionOptions::default());
    session.init().unwrap();

    let error = session.get_statistics().unwrap_err();
    assert!(matches!(error, AppError::ResultBeforeTrigger(_)));
    assert_eq!(error.exit_code(), 6);
}

#[test]
fn test_repeated_close_and_drop() {
    let (engine, log) = ScriptedEngine::new(vec![]);
    {
        let mut session = SessionController::new(engine, SessionOptions::default());
        session.init().unwrap();
        session.close().unwrap();
        session.close().unwrap();
        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
    }
    assert_eq!(log.borrow().shutdowns, 1);
}

#[test]
fn test_drop_closes_unclosed_session() {
    let (engine, log) = ScriptedEngine::new(vec![]);
    {
        let mut session = SessionController::new(engine, SessionOptions::default());
        session.init().unwrap();
    }
    assert_eq!(log.borrow().shutdowns, 1);
}

#[test]
fn test_second_trigger_replaces_report() {
    let (engine, _log) = ScriptedEngine::new(vec![
        sample("10.0.0.1", 200, (0.1, 0.2, 0.3, 0.4)),
        sample("10.0.0.9", 404, (0.5, 0.6, 0.7, 0.8)),
    ]);
    let mut session = SessionController::new(engine, SessionOptions::default());
    session.init().unwrap();

    let request = RequestConfig::new(1, "http://example.com/");
    session.trigger(&request).unwrap();
    session.trigger(&request).unwrap();

    assert_eq!(
        session.get_statistics().unwrap(),
        "SKTEST;10.0.0.9;404;0.500000;0.600000;0.700000;0.800000"
    );
}

#[test]
fn test_header_policy_reset_clears_between_triggers() {
    let (engine, log) = ScriptedEngine::new(vec![
        sample("10.0.0.1", 200, (0.1, 0.2, 0.3, 0.4)),
        sample("10.0.0.1", 200, (0.1, 0.2, 0.3, 0.4)),
    ]);
    let options = SessionOptions {
        header_policy: HeaderPolicy::ResetAfterTrigger,
        ..Default::default()
    };
    let mut session = SessionController::new(engine, options);
    session.init().unwrap();

    session.add_header("Accept: text/html").unwrap();
    let request = RequestConfig::new(1, "http://example.com/");
    session.trigger(&request).unwrap();
    session.trigger(&request).unwrap();

    let log = log.borrow();
    assert_eq!(log.configured[0].headers.len(), 1);
    assert!(log.configured[1].headers.is_empty());
}

#[test]
fn test_app_execute_success() {
    let (engine, log) = ScriptedEngine::new(three_samples());
    let config = Config {
        repeat_count: 3,
        target_url: "http://example.com/".to_string(),
        headers: vec!["X-Probe: 1".to_string()],
        ..Default::default()
    };

    let report = App::execute(&config, engine).unwrap();

    assert_eq!(
        report,
        "SKTEST;93.184.216.34;200;0.015000;0.030000;0.200000;0.200000"
    );
    let log = log.borrow();
    assert_eq!(log.starts, 1);
    assert_eq!(log.shutdowns, 1);
    assert_eq!(log.configured[0].headers[0].as_str(), "X-Probe: 1");
}

#[test]
fn test_app_execute_invalid_header_closes_session() {
    let (engine, log) = ScriptedEngine::new(three_samples());
    let config = Config {
        headers: vec!["header_only".to_string()],
        ..Default::default()
    };

    let error = App::execute(&config, engine).unwrap_err();

    assert!(matches!(error, AppError::InvalidHeader(_)));
    let log = log.borrow();
    assert_eq!(log.performed, 0);
    assert_eq!(log.shutdowns, 1);
}

#[test]
fn test_app_execute_invalid_count_never_reaches_transport() {
    let (engine, log) = ScriptedEngine::new(three_samples());
    let config = Config {
        repeat_count: 17,
        ..Default::default()
    };

    let error = App::execute(&config, engine).unwrap_err();

    assert!(matches!(error, AppError::InvalidRequestCount(_)));
    assert_eq!(error.exit_code(), 1);
    assert!(log.borrow().configured.is_empty());
}

#[test]
fn test_app_execute_transport_failure() {
    let (engine, log) = ScriptedEngine::new(vec![
        sample("10.0.0.1", 200, (0.1, 0.2, 0.3, 0.4)),
        Err(AppError::transport("Connection refused")),
    ]);
    let config = Config {
        repeat_count: 2,
        ..Default::default()
    };

    let error = App::execute(&config, engine).unwrap_err();

    assert!(matches!(error, AppError::Transport(ref msg) if msg == "Connection refused"));
    assert_eq!(error.exit_code(), 2);
    assert_eq!(log.borrow().shutdowns, 1);
}
