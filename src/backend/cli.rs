//! Subprocess backend
//!
//! Runs `<program> [--config <file>] <resource> <command> [--<param> <value>]...`
//! and parses stdout as JSON. A non-zero exit status is a failure; stderr
//! becomes the error message.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

use super::{Backend, Params, Record};
use crate::error::BackendError;

/// Name of the platform's command-line client
pub const DEFAULT_CLI_PROGRAM: &str = "okta-cli-client";

/// Backend that shells out to the platform's command-line client
#[derive(Debug, Clone)]
pub struct CliBackend {
    program: String,
    config_file: Option<PathBuf>,
}

impl CliBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            config_file: None,
        }
    }

    /// Pass `--config <file>` on every invocation
    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = Some(config_file.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Assemble the argument list for one invocation
    fn args(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
        body: Option<&Record>,
    ) -> Result<Vec<String>, BackendError> {
        let mut args = Vec::new();

        if let Some(config) = &self.config_file {
            args.push("--config".to_string());
            args.push(config.display().to_string());
        }

        args.push(resource.to_string());
        args.push(command.to_string());

        for (name, value) in params {
            args.push(format!("--{}", name));
            args.push(value.clone());
        }

        if let Some(body) = body {
            let data = serde_json::to_string(body).map_err(|e| BackendError::InvalidResponse {
                resource: resource.to_string(),
                command: command.to_string(),
                message: format!("could not encode request body: {}", e),
            })?;
            args.push("--data".to_string());
            args.push(data);
        }

        Ok(args)
    }

    fn run(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
        body: Option<&Record>,
    ) -> Result<Vec<u8>, BackendError> {
        let args = self.args(resource, command, params, body)?;
        tracing::debug!(program = %self.program, resource, command, ?params, "invoking backend");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| BackendError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        check_status(resource, command, output)
    }
}

impl Default for CliBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CLI_PROGRAM)
    }
}

impl Backend for CliBackend {
    fn list(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        let stdout = self.run(resource, command, params, None)?;
        parse_records(resource, command, &stdout)
    }

    fn get(&self, resource: &str, command: &str) -> Result<Record, BackendError> {
        let stdout = self.run(resource, command, &Params::new(), None)?;
        parse_record(resource, command, &stdout)
    }

    fn create(
        &self,
        resource: &str,
        record: &Record,
        params: &Params,
    ) -> Result<Record, BackendError> {
        let stdout = self.run(resource, "create", params, Some(record))?;
        parse_record(resource, "create", &stdout)
    }

    fn associate(
        &self,
        resource: &str,
        command: &str,
        params: &Params,
        body: Option<&Record>,
    ) -> Result<(), BackendError> {
        self.run(resource, command, params, body).map(|_| ())
    }
}

fn check_status(resource: &str, command: &str, output: Output) -> Result<Vec<u8>, BackendError> {
    if output.status.success() {
        return Ok(output.stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    };

    if is_conflict_message(&message) {
        Err(BackendError::Conflict {
            resource: resource.to_string(),
            command: command.to_string(),
            message,
        })
    } else {
        Err(BackendError::Failed {
            resource: resource.to_string(),
            command: command.to_string(),
            message,
        })
    }
}

/// Whether an error message says the object already exists in the target
fn is_conflict_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("already exists") || lower.contains("409")
}

fn invalid(resource: &str, command: &str, message: impl Into<String>) -> BackendError {
    BackendError::InvalidResponse {
        resource: resource.to_string(),
        command: command.to_string(),
        message: message.into(),
    }
}

/// Parse a list response: an array of objects, a single object, or nothing
fn parse_records(
    resource: &str,
    command: &str,
    stdout: &[u8],
) -> Result<Vec<Record>, BackendError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_slice(stdout).map_err(|e| invalid(resource, command, e.to_string()))?;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(invalid(
                    resource,
                    command,
                    format!("expected an object in list, got {}", other),
                )),
            })
            .collect(),
        other => Err(invalid(
            resource,
            command,
            format!("expected a list of objects, got {}", other),
        )),
    }
}

fn parse_record(resource: &str, command: &str, stdout: &[u8]) -> Result<Record, BackendError> {
    match serde_json::from_slice(stdout) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(invalid(
            resource,
            command,
            format!("expected an object, got {}", other),
        )),
        Err(e) => Err(invalid(resource, command, e.to_string())),
    }
}
