//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration.
    ///
    /// Precedence: defaults, then `.env` and process environment, then CLI.
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file()?;
        self.parse_without_env_file()
    }

    /// Same as [`parse`](Self::parse) without looking for a `.env` file
    pub fn parse_without_env_file(&self) -> Result<Config> {
        let mut config = Config::default();
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(count) = self.cli.count {
            config.repeat_count = count;
        }

        if let Some(ref url) = self.cli.url {
            config.target_url = url.clone();
        }

        config.headers.extend(self.cli.headers.iter().cloned());

        if let Some(ref trace_dir) = self.cli.trace_dir {
            config.trace_dir = Some(trace_dir.clone());
        }

        if let Some(policy) = self.cli.header_policy {
            config.header_policy = policy;
        }

        if let Some(format) = self.cli.format {
            config.report_format = format;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = Some(timeout);
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        if self.cli.log_format.is_some() {
            config.log_format = self.cli.log_format;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Target URL: {}", config.target_url));
    summary.push(format!("Repeat Count: {}", config.repeat_count));
    summary.push(format!("Headers: {}", config.headers.len()));
    summary.push(format!("Header Policy: {}", config.header_policy));
    summary.push(format!(
        "Trace Dir: {}",
        config
            .trace_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "disabled".to_string())
    ));
    summary.push(format!(
        "Timeout: {}",
        config
            .timeout_seconds
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string())
    ));
    summary.push(format!("Report Format: {}", config.report_format));

    summary.join("\n")
}
