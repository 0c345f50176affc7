//! CLI command implementations
//!
//! Every command loads the config, opens the store under `data_dir`, runs
//! one operation and writes one JSON response line to `out`.

use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::program::ProgramId;
use crate::service::{ProgramService, ServiceError};
use crate::store::{Dataset, FileStore, STORE_FILE_NAME};
use crate::validation::{parse_program, Errors};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Parse args and run against stdin/stdout
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_command(cli.command, &mut stdin.lock(), &mut stdout.lock())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, input: &mut dyn Read, out: &mut dyn Write) -> CliResult<()> {
    match cmd {
        Command::Init { config, dataset } => init(&config, dataset.as_deref(), out),
        Command::Validate { config } => validate(&config, input, out),
        Command::Save { config } => save(&config, input, out),
        Command::Show { config, id } => show(&config, ProgramId(id), out),
        Command::List {
            config,
            include_retired,
        } => list(&config, include_retired, out),
        Command::Retire { config, id, reason } => retire(&config, ProgramId(id), &reason, out),
        Command::Unretire { config, id } => unretire(&config, ProgramId(id), out),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("data_dir", &config.data_dir), ("path", &config_path.display().to_string())],
    );
    Ok(config)
}

fn open_store(config: &Config) -> CliResult<FileStore> {
    if !config.data_path().join(STORE_FILE_NAME).exists() {
        return Err(CliError::not_initialized());
    }
    Ok(FileStore::open(config.data_path())?)
}

fn to_json<T: serde::Serialize>(value: &T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Report a service failure on `out`, then hand it back for the exit code
fn report_failure(out: &mut dyn Write, err: ServiceError) -> CliResult<()> {
    let details = match err.field_errors() {
        Some(errors) => Some(to_json(errors)?),
        None => None,
    };
    write_error(out, err.code(), &err.to_string(), details)?;
    Err(CliError::from(err))
}

/// Write a service result as a response, or report its failure
fn respond<T: serde::Serialize>(
    out: &mut dyn Write,
    result: Result<T, ServiceError>,
) -> CliResult<()> {
    match result {
        Ok(value) => write_response(out, to_json(&value)?),
        Err(e) => report_failure(out, e),
    }
}

/// Create the data directory and store file.
///
/// Seeds the store from `dataset` when given. Refuses to overwrite an
/// existing store.
pub fn init(config_path: &Path, dataset: Option<&Path>, out: &mut dyn Write) -> CliResult<()> {
    let config = load_config(config_path)?;

    if config.data_path().join(STORE_FILE_NAME).exists() {
        return Err(CliError::already_initialized());
    }

    let dataset = match dataset {
        Some(path) => Dataset::load(path)?,
        None => Dataset::default(),
    };
    let concepts = dataset.concepts.len();
    let programs = dataset.programs.len();

    let store = FileStore::create(config.data_path(), dataset)?;

    write_response(
        out,
        json!({
            "store": store.path().display().to_string(),
            "concepts": concepts,
            "programs": programs
        }),
    )
}

/// Validate one program from `input` without saving it
pub fn validate(config_path: &Path, input: &mut dyn Read, out: &mut dyn Write) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = ProgramService::new(&store, &store, config.limits);

    let request = read_request(input)?;
    let mut errors = Errors::new();
    if let Err(e) = service.validator().validate_value(&request, &mut errors) {
        return report_failure(out, ServiceError::from(e));
    }

    write_response(
        out,
        json!({
            "valid": !errors.has_errors(),
            "errors": to_json(&errors)?
        }),
    )
}

/// Validate and save one program from `input`
pub fn save(config_path: &Path, input: &mut dyn Read, out: &mut dyn Write) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = ProgramService::new(&store, &store, config.limits);

    let request = read_request(input)?;
    let result = parse_program(&request)
        .map_err(ServiceError::from)
        .and_then(|program| service.save_program(program));

    respond(out, result)
}

/// Print one program
pub fn show(config_path: &Path, id: ProgramId, out: &mut dyn Write) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = ProgramService::new(&store, &store, config.limits);

    respond(out, service.get_program(id))
}

/// Print all programs
pub fn list(config_path: &Path, include_retired: bool, out: &mut dyn Write) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = ProgramService::new(&store, &store, config.limits);

    respond(out, service.get_all_programs(include_retired))
}

/// Retire a program
pub fn retire(
    config_path: &Path,
    id: ProgramId,
    reason: &str,
    out: &mut dyn Write,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = ProgramService::new(&store, &store, config.limits);

    respond(out, service.retire_program(id, reason))
}

/// Return a retired program to service
pub fn unretire(config_path: &Path, id: ProgramId, out: &mut dyn Write) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = ProgramService::new(&store, &store, config.limits);

    respond(out, service.unretire_program(id))
}
