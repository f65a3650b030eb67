//! CLI module for sasync
//!
//! Provides command-line access to the local savegame scan, the sync
//! service and the configuration file.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

/// sasync - GTA San Andreas savegame browser and sync client
#[derive(Parser, Debug)]
#[command(name = "sasync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Candidate service address, repeatable; the first one given is used
    #[arg(long = "address", value_name = "ADDR", global = true)]
    pub addresses: Vec<String>,

    /// Service port
    #[arg(long, value_name = "PORT", default_value_t = 0, global = true)]
    pub port: u16,

    /// Output format
    #[command(flatten)]
    pub output: OutputOptions,

    /// Starts the desktop app when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output formatting options
#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Output in JSON format (for machine parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search local directories for savegames
    Scan {
        /// Directory to search (configured or detected directory if omitted)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Traversal strategy
        #[arg(long, value_enum, default_value = "walk")]
        method: commands::scan::ScanMethod,

        /// Compute a SHA-256 checksum for each savegame
        #[arg(long)]
        hashes: bool,
    },

    /// Savegames stored on the sync service
    Remote {
        #[command(subcommand)]
        command: commands::remote::RemoteCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

/// Run a parsed command
pub async fn run(
    command: Commands,
    addresses: &[String],
    port: u16,
    output: &OutputOptions,
) -> anyhow::Result<()> {
    let format = output.format();
    let quiet = output.quiet;

    match command {
        Commands::Scan {
            root,
            method,
            hashes,
        } => commands::scan::run(root, method, hashes, format, quiet).await,
        Commands::Remote { command } => {
            commands::remote::run(command, addresses, port, format, quiet).await
        }
        Commands::Config { command } => commands::config::run(command, format, quiet).await,
    }
}
