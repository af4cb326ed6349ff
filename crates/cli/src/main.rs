// Shelfwatch CLI - inventory health analysis over POS and stock exports

mod analysis;
mod discover;
mod exit_codes;
mod report;
mod tui;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "shelfwatch")]
#[command(about = "Inventory health analysis over sales and stock exports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis pass from a TOML config file
    #[command(after_help = "\
Exit code 3 indicates critical SKUs in the scope, regardless of any view
filters. Use it as a replenishment gate in scripts.

Examples:
  shelfwatch run stores.toml
  shelfwatch run stores.toml --store AMB
  shelfwatch run stores.toml --status critical --status need-reorder
  shelfwatch run stores.toml --json | jq .summary
  shelfwatch run stores.toml --csv report.csv --output result.json
  shelfwatch run stores.toml --category Tops --min-stock 10")]
    Run {
        /// Path to the analysis config file
        config: PathBuf,

        /// Restrict the analysis to one store (default: all stores)
        #[arg(long)]
        store: Option<String>,

        /// Keep only records in this category
        #[arg(long)]
        category: Option<String>,

        /// Keep only these statuses (repeatable)
        #[arg(long, value_name = "STATUS")]
        status: Vec<String>,

        /// Keep only records with month cover >= X
        #[arg(long, value_name = "X")]
        min_cover: Option<f64>,

        /// Keep only records with month cover <= X
        #[arg(long, value_name = "X")]
        max_cover: Option<f64>,

        /// Keep only records with at least N units on hand
        #[arg(long, value_name = "N")]
        min_stock: Option<i64>,

        /// Output JSON result to stdout instead of just the summary
        #[arg(long)]
        json: bool,

        /// Write JSON result to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write CSV export to file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Validate a config without running the analysis
    #[command(after_help = "\
Examples:
  shelfwatch validate stores.toml")]
    Validate {
        /// Path to the analysis config file
        config: PathBuf,
    },

    /// Draft a config from a directory using the legacy file-name protocol
    #[command(after_help = "\
Examples:
  shelfwatch discover ./exports > stores.toml")]
    Discover {
        /// Directory holding the legacy export files
        dir: PathBuf,
    },

    /// Interactive dashboard over one analysis config
    #[command(after_help = "\
Examples:
  shelfwatch dash stores.toml
  shelfwatch dash stores.toml --store AMB")]
    Dash {
        /// Path to the analysis config file
        config: PathBuf,

        /// Start scoped to one store
        #[arg(long)]
        store: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            store,
            category,
            status,
            min_cover,
            max_cover,
            min_stock,
            json,
            output,
            csv,
        } => analysis::cmd_run(analysis::RunArgs {
            config,
            store,
            category,
            status,
            min_cover,
            max_cover,
            min_stock,
            json,
            output,
            csv,
        }),
        Commands::Validate { config } => analysis::cmd_validate(config),
        Commands::Discover { dir } => discover::cmd_discover(dir),
        Commands::Dash { config, store } => tui::cmd_dash(config, store),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
