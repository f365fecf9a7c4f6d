//! Execution gateway - the single entry point callers use.

use crate::normalize::normalize;
use crate::runner::SandboxRunner;
use crate::types::{ExecutionId, ExecutionRequest, ExecutionResult};
use crate::validator::{validate, ValidationVerdict};
use std::sync::Arc;
use std::time::Duration;

/// Snippet and marker used by the health probe.
const HEALTH_MARKER: &str = "anygraph sandbox is working";

/// Owns the lifecycle of sandbox executions: validate, run, normalize.
///
/// Constructed explicitly and passed by handle to whatever layer needs it;
/// there is no process-wide instance. Calls are independent - the gateway
/// holds no mutable state, so `execute` may run concurrently from as many
/// tasks as the caller likes.
#[derive(Clone)]
pub struct ExecutionGateway {
    runner: Arc<dyn SandboxRunner>,
}

impl ExecutionGateway {
    pub fn new(runner: impl SandboxRunner + 'static) -> Self {
        Self {
            runner: Arc::new(runner),
        }
    }

    pub fn from_shared(runner: Arc<dyn SandboxRunner>) -> Self {
        Self { runner }
    }

    /// Run one snippet through validate → run → normalize.
    ///
    /// Infallible by signature: every failure mode comes back inside the
    /// [`ExecutionResult`]. Rejected code never reaches the runner and
    /// reports a zero duration.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let id = ExecutionId::new();
        tracing::info!(
            execution_id = %id,
            runner = self.runner.name(),
            code_len = request.source_code.len(),
            timeout_secs = request.timeout.as_secs(),
            "Executing analysis code"
        );

        if let ValidationVerdict::Rejected { reason } = validate(&request.source_code) {
            tracing::warn!(execution_id = %id, %reason, "Code rejected by validator");
            return ExecutionResult::validation_rejected(&reason);
        }

        let outcome = self.runner.run(&request.source_code, request.timeout).await;
        let result = normalize(outcome, request.timeout);

        tracing::info!(
            execution_id = %id,
            success = result.success,
            duration_ms = result.duration.as_millis() as u64,
            artifacts = result.extracted_artifacts.len(),
            "Execution finished"
        );
        result
    }

    /// Cheap liveness check: print a known string through the full
    /// pipeline. For health endpoints only, never for request serving.
    pub async fn health_probe(&self) -> bool {
        let request = ExecutionRequest::new(format!("print(\"{HEALTH_MARKER}\")"))
            .with_timeout(Duration::from_secs(10));
        let result = self.execute(request).await;
        result.success && result.stdout_text.contains(HEALTH_MARKER)
    }

    /// Runner name, for diagnostics.
    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }
}
