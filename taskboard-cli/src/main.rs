use clap::Parser;
use std::process;

mod cli;
mod commands;
mod config;
mod exit_codes;
mod table;

use exit_codes::EXIT_ERROR;

fn main() {
    let cli = cli::Cli::parse();
    configure_logging(cli.verbose, cli.debug, cli.quiet);

    let exit_code = match commands::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_ERROR
        }
    };
    process::exit(exit_code);
}

/// Log to stderr so command output on stdout stays machine-readable.
///
/// `RUST_LOG` takes precedence over the flags.
fn configure_logging(verbose: bool, debug: bool, quiet: bool) {
    use tracing::Level;
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let log_level = if quiet {
        Level::ERROR
    } else if debug {
        Level::DEBUG
    } else if verbose {
        Level::TRACE
    } else {
        Level::WARN
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
