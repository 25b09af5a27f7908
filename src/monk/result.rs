//! Command results and output classification.
//!
//! Every bridge invocation produces exactly one [`CommandResult`]. The
//! payload is derived from standard output by trying JSON, then YAML, then
//! falling back to the trimmed text.

use serde_json::Value;
use std::fmt;

/// The classified standard output of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A document produced by the JSON or YAML parser.
    Structured(Value),
    /// Output that no parser accepted, trimmed.
    Text(String),
}

impl Payload {
    /// Returns the structured value, if any.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the payload as a string when it is textual.
    ///
    /// Scalar strings produced by the YAML parser count as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Structured(Value::String(s)) => Some(s),
            Self::Structured(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Compact single-line rendering used by the response trace.
    pub fn compact(&self) -> String {
        match self {
            Self::Structured(Value::String(s)) => s.clone(),
            Self::Structured(value) => value.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// Why a command did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFailure {
    /// The process did not finish within the timeout.
    Timeout,
    /// The executable could not be located.
    ExecutableNotFound,
    /// Spawning or waiting failed for another reason.
    UnexpectedInvocationFailure,
    /// The process ran and exited with a non-zero status.
    NonZeroExit,
}

impl CommandFailure {
    /// Returns true for failures where the external process never reported a status.
    pub fn is_infrastructure(self) -> bool {
        !matches!(self, Self::NonZeroExit)
    }
}

/// Outcome of a single bridge invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// True iff the process exited with status 0.
    pub succeeded: bool,
    /// Classified standard output.
    pub payload: Option<Payload>,
    /// Diagnostic text (stderr, or a bridge-generated description).
    pub error_text: String,
    /// Trimmed standard output.
    pub raw_output: String,
    /// Process exit code, or -1 when the process could not be started or did not finish.
    pub exit_code: i32,
    /// Failure classification, `None` on success.
    pub failure: Option<CommandFailure>,
}

/// Exit code reserved for infrastructure failures.
pub const INFRASTRUCTURE_EXIT_CODE: i32 = -1;

impl CommandResult {
    /// Builds a result from a completed process.
    pub fn from_process(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let succeeded = exit_code == 0;
        Self {
            succeeded,
            payload: classify_output(stdout),
            error_text: stderr.trim().to_string(),
            raw_output: stdout.trim().to_string(),
            exit_code,
            failure: (!succeeded).then_some(CommandFailure::NonZeroExit),
        }
    }

    /// Builds a result for a process that never produced an exit status.
    pub fn infrastructure(failure: CommandFailure, error_text: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            payload: None,
            error_text: error_text.into(),
            raw_output: String::new(),
            exit_code: INFRASTRUCTURE_EXIT_CODE,
            failure: Some(failure),
        }
    }

    /// Returns the structured payload, if any.
    pub fn value(&self) -> Option<&Value> {
        self.payload.as_ref().and_then(Payload::as_value)
    }

    /// Returns the payload as a JSON object, if it is one.
    pub fn object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.value().and_then(Value::as_object)
    }

    /// Returns the textual payload, if any.
    pub fn text(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Payload::as_str)
    }

    /// Returns true if the command timed out.
    pub fn timed_out(&self) -> bool {
        self.failure == Some(CommandFailure::Timeout)
    }

    /// Error text, or the given fallback when the process wrote nothing.
    pub fn error_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.error_text.is_empty() {
            fallback
        } else {
            &self.error_text
        }
    }
}

/// Classifies standard output into a payload.
///
/// Order matters: JSON first, then YAML (which also accepts plain scalars),
/// then the trimmed text. A parse failure at any stage falls through to the
/// next representation. A top-level null document yields no payload.
/// YAML values with no JSON form (`.nan`, `.inf`) are kept as text.
pub fn classify_output(stdout: &str) -> Option<Payload> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(stdout) {
        return structured(value);
    }

    if let Ok(yaml) = serde_yaml::from_str::<serde_yaml::Value>(stdout) {
        if yaml.is_null() {
            return None;
        }
        match serde_json::to_value(&yaml) {
            Ok(value) if !value.is_null() => return Some(Payload::Structured(value)),
            _ => {}
        }
    }

    Some(Payload::Text(trimmed.to_string()))
}

fn structured(value: Value) -> Option<Payload> {
    if value.is_null() {
        None
    } else {
        Some(Payload::Structured(value))
    }
}
