use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Manual gated review of sample documents.
#[derive(Debug, Parser)]
#[command(name = "gatereview", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Review the documents in a folder interactively
    Review(ReviewArgs),

    /// Print what is recorded for one sample
    Summary(SummaryArgs),

    /// List the samples of a folder in review order
    Samples(SamplesArgs),

    /// Inspect or scaffold layout files
    #[command(subcommand)]
    Layout(LayoutCommand),
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Folder holding the sample documents
    #[arg(long = "input", short = 'i', value_name = "DIR")]
    pub input: PathBuf,

    /// Layout file naming the gate and its triggers
    #[arg(long = "layout", short = 'l', value_name = "FILE")]
    pub layout: PathBuf,

    /// Correction file to use instead of `<input>/output/correction.yaml`
    #[arg(long = "store", value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Settings file (defaults to the first gatereview.toml found)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Discard and clear without asking first
    #[arg(long = "no-confirm")]
    pub no_confirm: bool,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Correction file to read
    #[arg(long = "store", value_name = "FILE")]
    pub store: PathBuf,

    /// Sample id (document file name without extension)
    #[arg(value_name = "SAMPLE")]
    pub sample: String,

    /// Output as JSON
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SamplesArgs {
    /// Folder holding the sample documents
    #[arg(long = "input", short = 'i', value_name = "DIR")]
    pub input: PathBuf,

    /// Correction file used to mark discarded samples
    #[arg(long = "store", value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Document extension (defaults to the configured one)
    #[arg(long = "extension", short = 'e', value_name = "EXT")]
    pub extension: Option<String>,

    /// Settings file (defaults to the first gatereview.toml found)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum LayoutCommand {
    /// Print a commented example layout
    Template,

    /// Load a layout and print its gate, categories and triggers
    Check {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn review_flags_parse() {
        let cli = Cli::try_parse_from([
            "gatereview",
            "review",
            "--input",
            "samples",
            "--layout",
            "singlet.yaml",
            "--no-confirm",
        ])
        .expect("parse");
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        assert_eq!(args.input, PathBuf::from("samples"));
        assert_eq!(args.layout, PathBuf::from("singlet.yaml"));
        assert!(args.no_confirm);
        assert_eq!(args.store, None);
    }

    #[test]
    fn summary_requires_store() {
        assert!(Cli::try_parse_from(["gatereview", "summary", "S01"]).is_err());
    }
}
