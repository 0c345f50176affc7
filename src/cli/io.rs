//! JSON I/O handling for the CLI
//!
//! - Input: one JSON document (stdin in `main`)
//! - Output: one JSON object per line (stdout in `main`)
//! - UTF-8 only

use std::io::{Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read one JSON document
pub fn read_request(input: &mut dyn Read) -> CliResult<Value> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;
    parse_request(&content)
}

pub(crate) fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Write a success response
pub fn write_response(out: &mut dyn Write, data: Value) -> CliResult<()> {
    write_value(out, &serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response; `details` carries field errors when present
pub fn write_error(
    out: &mut dyn Write,
    code: &str,
    message: &str,
    details: Option<Value>,
) -> CliResult<()> {
    let mut response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    if let Some(details) = details {
        response["details"] = details;
    }
    write_value(out, &response)
}

fn write_value(out: &mut dyn Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
