//! sparklog CLI
//!
//! Read-only command-line tools for sparklog log files.
//!
//! # Commands
//!
//! - `inspect` - Display log statistics and metadata
//! - `dump` - Print entries for debugging
//! - `get` - Look up the live value of a key
//! - `verify` - Read every byte of the log and check its framing

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// sparklog command-line log tools.
#[derive(Parser)]
#[command(name = "sparklog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the log file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display log statistics and metadata
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print log entries for debugging
    Dump {
        /// Maximum number of entries to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip this many entries first
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Only print the live version of each key
        #[arg(long)]
        live: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the live value of a key
    Get {
        /// Key to look up
        key: String,

        /// Print the value hex-encoded
        #[arg(long)]
        hex: bool,
    },

    /// Verify log integrity
    Verify {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Log path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Dump {
            limit,
            skip,
            live,
            format,
        } => {
            let path = cli.path.ok_or("Log path required for dump")?;
            commands::dump::run(&path, limit, skip, live, &format)?;
        }
        Commands::Get { key, hex } => {
            let path = cli.path.ok_or("Log path required for get")?;
            commands::get::run(&path, key.as_bytes(), hex)?;
        }
        Commands::Verify { format } => {
            let path = cli.path.ok_or("Log path required for verify")?;
            commands::verify::run(&path, &format)?;
        }
        Commands::Version => {
            println!("sparklog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Log format v{}", sparklog_core::FORMAT_VERSION);
        }
    }

    Ok(())
}
