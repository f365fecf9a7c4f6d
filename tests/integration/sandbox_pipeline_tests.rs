//! Sandbox pipeline against a real interpreter.

use crate::common::setup_test_logging;
use crate::skip_without_python;
use anygraph_sandbox::{
    Artifact, ExecutionGateway, ExecutionRequest, FailureKind, ProcessRunner, SandboxRunner,
};
use assert_matches::assert_matches;
use std::time::{Duration, Instant};

fn gateway() -> ExecutionGateway {
    ExecutionGateway::new(ProcessRunner::new())
}

#[tokio::test]
async fn test_sleeping_snippet_times_out_within_bounds() {
    setup_test_logging();
    skip_without_python!();

    let code = "import time\nprint(\"got this far\", flush=True)\ntime.sleep(10)\n";
    let started = Instant::now();
    let result = gateway()
        .execute(ExecutionRequest::new(code).with_timeout(Duration::from_secs(1)))
        .await;
    let elapsed = started.elapsed();

    assert!(!result.success);
    assert_matches!(result.failure, Some(FailureKind::TimeoutExceeded));
    let error = result.error_text.unwrap();
    assert!(error.contains("timed out"), "error was: {error}");
    // The call must return within a small constant factor of the budget,
    // not after the snippet's own 10 second nap.
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    // Partial output captured before the kill is preserved.
    assert!(result.stdout_text.contains("got this far"));
}

#[tokio::test]
async fn test_markdown_table_output_passes_through() {
    setup_test_logging();
    skip_without_python!();

    let table = "## Result\n| a | b |\n|---|---|\n| 1 | 2 |";
    let code = format!("print(\"\"\"{table}\"\"\")");
    let result = gateway().execute(ExecutionRequest::new(code)).await;

    assert!(result.success, "error: {:?}", result.error_text);
    assert!(result.stdout_text.contains(table));
    assert!(result.extracted_artifacts.is_empty());
}

#[tokio::test]
async fn test_embedded_image_is_extracted_and_text_retained() {
    setup_test_logging();
    skip_without_python!();

    let code = "print('![Chart](data:image/png;base64,QUJD)')";
    let result = gateway().execute(ExecutionRequest::new(code)).await;

    assert!(result.success);
    assert_eq!(result.extracted_artifacts, vec![Artifact::new("QUJD")]);
    assert!(result
        .stdout_text
        .contains("![Chart](data:image/png;base64,QUJD)"));
}

#[tokio::test]
async fn test_unhandled_fault_keeps_prior_stdout() {
    setup_test_logging();
    skip_without_python!();

    let code = "print(\"before the fault\", flush=True)\nraise RuntimeError(\"boom\")\n";
    let result = gateway().execute(ExecutionRequest::new(code)).await;

    assert!(!result.success);
    assert_matches!(result.failure, Some(FailureKind::RuntimeFailure));
    let error = result.error_text.unwrap();
    assert!(error.contains("RuntimeError"), "error was: {error}");
    assert!(result.stdout_text.contains("before the fault"));
}

#[tokio::test]
async fn test_second_run_cannot_see_first_runs_files() {
    setup_test_logging();
    skip_without_python!();

    // Writes a marker into the working directory after reporting whether
    // one already exists. With a fresh scratch dir per execution the
    // second run must also report False.
    let code = r#"
from pathlib import Path
marker = Path("marker.txt")
print(marker.exists())
marker.write_text("leftover")
"#;
    let gateway = gateway();
    let first = gateway.execute(ExecutionRequest::new(code)).await;
    let second = gateway.execute(ExecutionRequest::new(code)).await;

    assert!(first.success && second.success);
    assert!(first.stdout_text.starts_with("False"));
    assert!(second.stdout_text.starts_with("False"));
}

#[tokio::test]
async fn test_health_probe_with_real_interpreter() {
    setup_test_logging();
    skip_without_python!();

    assert!(gateway().health_probe().await);
}

#[tokio::test]
async fn test_health_probe_reports_missing_interpreter() {
    setup_test_logging();

    let gateway = ExecutionGateway::new(ProcessRunner::with_interpreter(
        "/nonexistent/python-interpreter",
    ));
    assert!(!gateway.health_probe().await);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_background_child_does_not_survive_natural_exit() {
    setup_test_logging();
    skip_without_python!();

    // Forks a child that naps well past the test, then exits immediately
    // without waiting for it. Run through the runner directly: the point
    // is group teardown, not validation (os.fork is denylisted upstream).
    let code = r#"
import os, time
pid = os.fork()
if pid == 0:
    time.sleep(30)
    os._exit(0)
print(pid, flush=True)
os._exit(0)
"#;
    let runner = ProcessRunner::new();
    let outcome = runner
        .run(code, Duration::from_secs(10))
        .await
        .expect("runner must produce an outcome");

    assert_eq!(outcome.exit_code, Some(0));
    let child_pid: i32 = outcome
        .stdout
        .trim()
        .parse()
        .expect("snippet prints the forked pid");

    assert!(
        process_gone_or_zombie(child_pid, Duration::from_secs(2)),
        "forked child {child_pid} still running after run returned"
    );
}

/// True once the pid no longer exists or is only a zombie awaiting reaping.
#[cfg(target_os = "linux")]
fn process_gone_or_zombie(pid: i32, patience: Duration) -> bool {
    let deadline = Instant::now() + patience;
    loop {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Err(_) => return true,
            Ok(stat) => {
                // State is the field after the parenthesized comm name.
                let state = stat
                    .rsplit_once(')')
                    .and_then(|(_, rest)| rest.trim_start().chars().next());
                if state == Some('Z') {
                    return true;
                }
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
