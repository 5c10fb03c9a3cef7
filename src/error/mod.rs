//! Error handling for connstat

use thiserror::Error;

/// Error kinds surfaced by the library and the CLI adapter
#[derive(Error, Debug)]
pub enum AppError {
    /// Repeat count outside `1..=MAX_SAMPLES`
    #[error("Invalid request count: {0}")]
    InvalidRequestCount(String),

    /// Target URL empty or outside the accepted length range
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Extra header missing, wrong length, or without a colon
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The transport engine could not be started
    #[error("Transport initialization error: {0}")]
    TransportInit(String),

    /// A request execution or a post-request query failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// File or directory I/O for trace sinks
    #[error("Resource error: {0}")]
    Resource(String),

    /// Statistics requested before any successful trigger
    #[error("No statistics available: {0}")]
    ResultBeforeTrigger(String),

    /// Command line or environment configuration could not be parsed
    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),

    /// Operation not allowed in the current session state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new request count error
    pub fn invalid_request_count<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequestCount(message.into())
    }

    /// Create a new URL error
    pub fn invalid_url<S: Into<String>>(message: S) -> Self {
        Self::InvalidUrl(message.into())
    }

    /// Create a new header error
    pub fn invalid_header<S: Into<String>>(message: S) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Create a new transport initialization error
    pub fn transport_init<S: Into<String>>(message: S) -> Self {
        Self::TransportInit(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new resource error
    pub fn resource<S: Into<String>>(message: S) -> Self {
        Self::Resource(message.into())
    }

    /// Create a new "no result yet" error
    pub fn result_before_trigger<S: Into<String>>(message: S) -> Self {
        Self::ResultBeforeTrigger(message.into())
    }

    /// Create a new argument parsing error
    pub fn argument_parsing<S: Into<String>>(message: S) -> Self {
        Self::ArgumentParsing(message.into())
    }

    /// Create a new session state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequestCount(_) => "REQUEST_COUNT",
            Self::InvalidUrl(_) => "URL",
            Self::InvalidHeader(_) => "HEADER",
            Self::TransportInit(_) => "TRANSPORT_INIT",
            Self::Transport(_) => "TRANSPORT",
            Self::Resource(_) => "RESOURCE",
            Self::ResultBeforeTrigger(_) => "NO_RESULT",
            Self::ArgumentParsing(_) => "ARGS",
            Self::InvalidState(_) => "STATE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether running the same operation again could succeed without changing input
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Resource(_) => true,
            Self::InvalidRequestCount(_) | Self::InvalidUrl(_) | Self::InvalidHeader(_) => false,
            Self::TransportInit(_) | Self::ResultBeforeTrigger(_) | Self::ArgumentParsing(_) => false,
            Self::InvalidState(_) | Self::Internal(_) => false,
        }
    }

    /// Whether the error was raised by input validation, before any transport work
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequestCount(_) | Self::InvalidUrl(_) | Self::InvalidHeader(_)
        )
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRequestCount(_) | Self::InvalidUrl(_) | Self::InvalidHeader(_) => 1,
            Self::ArgumentParsing(_) => 1,
            Self::Transport(_) => 2,
            Self::TransportInit(_) => 3,
            Self::Resource(_) => 5,
            Self::ResultBeforeTrigger(_) | Self::InvalidState(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::InvalidRequestCount(_)
                | Self::InvalidUrl(_)
                | Self::InvalidHeader(_)
                | Self::ArgumentParsing(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Transport(_) | Self::TransportInit(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Resource(_) | Self::ResultBeforeTrigger(_) | Self::InvalidState(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::transport(format!("URL parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::transport(format!("request setup failed: {}", error))
        } else if error.is_timeout() {
            Self::transport(format!("request timed out: {}", error))
        } else {
            Self::transport(error.to_string())
        }
    }
}

/// Custom Result type for the crate
pub type Result<T> = std::result::Result<T, AppError>;
