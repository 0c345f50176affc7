//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::service::ServiceError;
use crate::store::StoreError;

/// What went wrong, as reported in the process exit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    ConfigError,
    /// Request stream unreadable or not JSON
    IoError,
    AlreadyInitialized,
    NotInitialized,
    /// Store could not be opened or written
    StoreError,
    /// Service rejected the request; details were written to the response
    ProgramError,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PROG_CLI_CONFIG_ERROR",
            Self::IoError => "PROG_CLI_IO_ERROR",
            Self::AlreadyInitialized => "PROG_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "PROG_CLI_NOT_INITIALIZED",
            Self::StoreError => "PROG_CLI_STORE_ERROR",
            Self::ProgramError => "PROG_CLI_PROGRAM_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'careprog init' first.",
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreError, format!("[{}] {}", e.code(), e))
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        Self::new(CliErrorCode::ProgramError, format!("[{}] {}", e.code(), e))
    }
}

pub type CliResult<T> = Result<T, CliError>;
