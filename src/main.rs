//! connstat - command line entry point
//!
//! Prints the report line on stdout; diagnostics and logs go to stderr.

use clap::{error::ErrorKind, Parser};
use connstat::{app::App, cli::Cli, error::AppError};
use std::io::IsTerminal;
use std::process;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(AppError::internal("panic").exit_code());
    }));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let error = AppError::argument_parsing(e.to_string().trim_end());
            eprintln!("{}", error.format_for_console(std::io::stderr().is_terminal()));
            process::exit(error.exit_code());
        }
    };

    let use_color = cli.use_colors() && std::io::stderr().is_terminal();

    match App::new(cli).run() {
        Ok(report) => println!("{}", report),
        Err(e) => {
            eprintln!("{}", e.format_for_console(use_color));
            process::exit(e.exit_code());
        }
    }
}
