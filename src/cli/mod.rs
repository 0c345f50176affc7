//! CLI module for careprog
//!
//! Commands take their input and output streams as arguments; `run` wires
//! them to stdin and stdout.
//!
//! Provides command-line interface for:
//! - init: Create the data directory and store file
//! - validate: Validate one program without saving
//! - save: Validate and save one program
//! - show / list: Read programs
//! - retire / unretire: Change retirement state

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, list, retire, run, run_command, save, show, unretire, validate};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
