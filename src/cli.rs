//! Command-line interface for kiosk-watchdog
//!
//! Uses clap with derive for type-safe CLI parsing

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use crate::lock::DEFAULT_LOCK_PATH;

/// kiosk-watchdog - health watchdog for a single-purpose kiosk display
#[derive(Parser)]
#[command(name = "kiosk-watchdog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Override file with KEY=VALUE settings
    #[arg(short, long, global = true, env = CONFIG_ENV, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Lock file guarding against overlapping runs
    #[arg(long, global = true, default_value = DEFAULT_LOCK_PATH)]
    pub lock_file: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Perform one watchdog run (default)
    Run {
        /// Log restart requests instead of issuing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the resolved configuration
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, `run` when none was given
    pub fn subcommand(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run { dry_run: false })
    }

    /// Generate shell completion scripts
    pub fn generate_completion(shell: Shell) {
        let mut cmd = <Self as CommandFactory>::command();
        clap_complete::generate(shell, &mut cmd, "kiosk-watchdog", &mut std::io::stdout());
    }
}
