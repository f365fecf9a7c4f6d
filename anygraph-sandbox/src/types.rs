//! Core types for sandbox execution

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock budget for one execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Unique execution identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to execute one snippet of analysis code.
///
/// Immutable once submitted; every request gets exactly one
/// [`ExecutionResult`] and its own throwaway sandbox instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The code to execute
    pub source_code: String,

    /// Wall-clock budget; the sandbox is torn down when it elapses
    pub timeout: Duration,
}

impl ExecutionRequest {
    /// Create a request with the default 60 second timeout.
    pub fn new(source_code: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the timeout. Values below one second are clamped up,
    /// keeping the "strictly positive" contract.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_secs(1));
        self
    }
}

/// What one process run actually did, before normalization.
#[derive(Debug, Clone)]
pub struct RawOutcome {
    /// Exit code, if the process exited on its own with one.
    /// `None` when it was killed (timeout or signal death).
    pub exit_code: Option<i32>,

    /// Captured stdout, including partial output before a kill
    pub stdout: String,

    /// Captured stderr, separate stream from stdout
    pub stderr: String,

    /// Wall-clock time from spawn to reap
    pub elapsed: Duration,

    /// Whether the deadline fired and the process group was killed
    pub timed_out: bool,
}

/// Why an execution failed; `None` on a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The validator refused the code; nothing was executed
    ValidationRejected,
    /// The code ran and exited non-zero (or died on a signal)
    RuntimeFailure,
    /// The wall-clock budget elapsed and the sandbox was torn down
    TimeoutExceeded,
    /// The execution environment itself is broken (interpreter missing,
    /// scratch space unavailable) - the code never got a fair run
    InfrastructureUnavailable,
}

impl FailureKind {
    /// Whether the fault lies with the environment rather than the code.
    /// Callers use this to surface "analysis engine unavailable" instead
    /// of blaming the snippet.
    pub fn is_infrastructure(self) -> bool {
        matches!(self, FailureKind::InfrastructureUnavailable)
    }
}

/// One binary payload lifted out of textual output - a chart image embedded
/// as a markdown `![…](data:image/png;base64,…)` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// The base64 payload exactly as it appeared in the output
    pub base64_data: String,
}

impl Artifact {
    pub fn new(base64_data: impl Into<String>) -> Self {
        Self {
            base64_data: base64_data.into(),
        }
    }

    /// Decode the payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.base64_data)
    }
}

/// Uniform result of one execution request.
///
/// Produced exactly once per request and never mutated afterwards. Every
/// failure mode is encoded here rather than raised, so callers can always
/// render a response to the end user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff the code ran to completion with exit code 0
    pub success: bool,

    /// Captured stdout; on failure, whatever was printed before the fault
    pub stdout_text: String,

    /// Human-readable failure description; `None` on success
    pub error_text: Option<String>,

    /// Failure taxonomy tag; `None` on success
    pub failure: Option<FailureKind>,

    /// Wall-clock duration of the run (zero when nothing was executed)
    pub duration: Duration,

    /// Base64 image payloads found in stdout, in order of appearance.
    /// The surrounding text is left intact in `stdout_text`.
    pub extracted_artifacts: Vec<Artifact>,
}

impl ExecutionResult {
    /// Result for code the validator refused to run.
    pub fn validation_rejected(reason: &str) -> Self {
        Self {
            success: false,
            stdout_text: String::new(),
            error_text: Some(format!("Security validation failed: {reason}")),
            failure: Some(FailureKind::ValidationRejected),
            duration: Duration::ZERO,
            extracted_artifacts: Vec::new(),
        }
    }
}
