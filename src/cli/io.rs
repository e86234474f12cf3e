//! JSON I/O handling for CLI
//!
//! - Arguments carrying values are JSON text
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Parse a JSON command-line argument
pub fn parse_json_arg(name: &str, text: &str) -> CliResult<Value> {
    serde_json::from_str(text)
        .map_err(|e| CliError::invalid_input(format!("{} is not valid JSON: {}", name, e)))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&success_response(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_response(code, message))
}

pub(crate) fn success_response(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

pub(crate) fn error_response(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg("value", "[1, 2]").unwrap(), json!([1, 2]));

        let err = parse_json_arg("value", "dark").unwrap_err();
        assert_eq!(err.code_str(), "JSONDB_CLI_INVALID_INPUT");
        assert!(err.message().starts_with("value is not valid JSON"));
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            success_response(json!({"id": 1})),
            json!({"status": "ok", "data": {"id": 1}})
        );
        assert_eq!(
            error_response("JSONDB_ID_NOT_FOUND", "missing"),
            json!({"status": "error", "code": "JSONDB_ID_NOT_FOUND", "message": "missing"})
        );
    }
}
