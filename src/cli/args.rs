//! CLI argument definitions using clap
//!
//! Commands:
//! - careprog init --config <path> [--dataset <file>]
//! - careprog validate --config <path>
//! - careprog save --config <path>
//! - careprog show --config <path> --id <n>
//! - careprog list --config <path> [--include-retired]
//! - careprog retire --config <path> --id <n> --reason <text>
//! - careprog unretire --config <path> --id <n>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// careprog - care program registry with strict field validation
#[derive(Parser, Debug)]
#[command(name = "careprog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and store file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,

        /// Dataset JSON to seed the store with
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Validate one program read from stdin
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,
    },

    /// Validate and save one program read from stdin
    Save {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,
    },

    /// Print one program
    Show {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,

        /// Program id
        #[arg(long)]
        id: u64,
    },

    /// Print all programs
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,

        /// Include retired programs
        #[arg(long)]
        include_retired: bool,
    },

    /// Retire a program
    Retire {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,

        /// Program id
        #[arg(long)]
        id: u64,

        /// Why the program is retired
        #[arg(long)]
        reason: String,
    },

    /// Return a retired program to service
    Unretire {
        /// Path to configuration file
        #[arg(long, default_value = "./careprog.json")]
        config: PathBuf,

        /// Program id
        #[arg(long)]
        id: u64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
