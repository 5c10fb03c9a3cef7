//! Main application orchestration and execution

use crate::{
    cli::Cli,
    client::{ReqwestEngine, TransportEngine},
    config::{display_config_summary, load_config},
    error::Result,
    log_debug, log_info,
    logging::LoggerFactory,
    models::Config,
    session::SessionController,
    PKG_NAME,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load configuration and sample the target with the production engine.
    ///
    /// Returns the rendered report.
    pub fn run(self) -> Result<String> {
        let config = load_config(self.cli)?;
        Self::execute(&config, ReqwestEngine::new())
    }

    /// Run one session against `engine`: init, add headers, trigger, close,
    /// then read the report back.
    ///
    /// Any failure closes the session before the error is returned.
    pub fn execute<E: TransportEngine>(config: &Config, engine: E) -> Result<String> {
        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP");
        log_debug!(logger, "{} {}", PKG_NAME, Cli::build_info());
        log_debug!(logger, "Configuration:\n{}", display_config_summary(config));

        let session_logger = factory.create_session_logger();
        let mut session = SessionController::new(engine, config.session_options())
            .with_logger(session_logger.clone())
            .with_report_format(config.report_format);

        if let Err(error) = Self::sample(&mut session, config) {
            session_logger.log_error(&error, Some("sampling failed"));
            if let Err(close_error) = session.close() {
                session_logger.log_error(&close_error, Some("closing after failure"));
            }
            return Err(error);
        }

        session.close()?;
        let report = session.get_statistics()?;
        log_info!(logger, "Sampling of {} finished", config.target_url);
        Ok(report)
    }

    fn sample<E: TransportEngine>(session: &mut SessionController<E>, config: &Config) -> Result<()> {
        session.init()?;
        for header in &config.headers {
            session.add_header(header)?;
        }
        session.trigger(&config.request_config())
    }
}
