//! `gatereview`: manual gated review of sample documents.
//!
//! Exit codes: 0 on success or a clean end of review, 1 on any fatal error
//! (unreadable input, corrupt correction store, invalid layout, empty folder).

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

/// Log to stderr for the non-interactive subcommands. `RUST_LOG` overrides.
fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // The review screen owns the terminal and logs to a file instead.
        Command::Review(args) => commands::review(args),
        Command::Summary(args) => {
            init_stderr_logging();
            commands::summary(args)
        }
        Command::Samples(args) => {
            init_stderr_logging();
            commands::samples(args)
        }
        Command::Layout(command) => {
            init_stderr_logging();
            commands::layout(command)
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
