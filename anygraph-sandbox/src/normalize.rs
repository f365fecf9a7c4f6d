//! Maps raw process outcomes into the uniform result record.

use crate::runner::RunnerError;
use crate::types::{Artifact, ExecutionResult, FailureKind, RawOutcome};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Inline-image marker: a markdown image whose target is a base64 PNG data
/// URL. Generated analysis code embeds charts this way because stdout is
/// the sole result channel.
static IMAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*\]\(data:image/png;base64,([A-Za-z0-9+/=]+)\)")
        .expect("image marker pattern is valid")
});

/// Collect every embedded image payload, in order of appearance.
/// The surrounding text is left untouched.
pub fn extract_artifacts(stdout_text: &str) -> Vec<Artifact> {
    IMAGE_MARKER
        .captures_iter(stdout_text)
        .map(|captures| Artifact::new(&captures[1]))
        .collect()
}

/// Produce the one [`ExecutionResult`] for a finished run.
///
/// `timeout` is the budget the request carried; it only feeds the timeout
/// message text.
pub fn normalize(outcome: Result<RawOutcome, RunnerError>, timeout: Duration) -> ExecutionResult {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            // The environment, not the code, is broken; callers surface
            // "analysis engine unavailable" instead of blaming the snippet.
            return ExecutionResult {
                success: false,
                stdout_text: String::new(),
                error_text: Some(format!("Analysis engine unavailable: {err}")),
                failure: Some(FailureKind::InfrastructureUnavailable),
                duration: Duration::ZERO,
                extracted_artifacts: Vec::new(),
            };
        }
    };

    let extracted_artifacts = extract_artifacts(&outcome.stdout);

    if outcome.timed_out {
        return ExecutionResult {
            success: false,
            stdout_text: outcome.stdout,
            error_text: Some(format!(
                "Execution timed out after {} seconds",
                timeout.as_secs()
            )),
            failure: Some(FailureKind::TimeoutExceeded),
            duration: outcome.elapsed,
            extracted_artifacts,
        };
    }

    match outcome.exit_code {
        Some(0) => ExecutionResult {
            success: true,
            stdout_text: outcome.stdout,
            error_text: None,
            failure: None,
            duration: outcome.elapsed,
            extracted_artifacts,
        },
        code => {
            let error_text = if outcome.stderr.trim().is_empty() {
                match code {
                    Some(code) => format!("Process exited with status {code} and no error output"),
                    None => "Process was killed by a signal".to_string(),
                }
            } else {
                outcome.stderr
            };
            ExecutionResult {
                success: false,
                stdout_text: outcome.stdout,
                error_text: Some(error_text),
                failure: Some(FailureKind::RuntimeFailure),
                duration: outcome.elapsed,
                extracted_artifacts,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: Option<i32>, stdout: &str, stderr: &str, timed_out: bool) -> RawOutcome {
        RawOutcome {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            elapsed: Duration::from_millis(42),
            timed_out,
        }
    }

    #[test]
    fn test_clean_exit_is_success() {
        let result = normalize(
            Ok(outcome(Some(0), "## Result\n42\n", "", false)),
            Duration::from_secs(60),
        );
        assert!(result.success);
        assert_eq!(result.stdout_text, "## Result\n42\n");
        assert!(result.error_text.is_none());
        assert!(result.failure.is_none());
        assert_eq!(result.duration, Duration::from_millis(42));
    }

    #[test]
    fn test_markdown_table_passes_through_without_artifacts() {
        let table = "## Result\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let result = normalize(Ok(outcome(Some(0), table, "", false)), Duration::from_secs(60));
        assert!(result.success);
        assert!(result.stdout_text.contains(table));
        assert!(result.extracted_artifacts.is_empty());
    }

    #[test]
    fn test_nonzero_exit_keeps_partial_stdout() {
        let result = normalize(
            Ok(outcome(
                Some(1),
                "partial output\n",
                "Traceback: ZeroDivisionError\n",
                false,
            )),
            Duration::from_secs(60),
        );
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::RuntimeFailure));
        assert_eq!(result.stdout_text, "partial output\n");
        assert_eq!(
            result.error_text.as_deref(),
            Some("Traceback: ZeroDivisionError\n")
        );
    }

    #[test]
    fn test_nonzero_exit_with_empty_stderr_synthesizes_message() {
        let result = normalize(Ok(outcome(Some(3), "", "", false)), Duration::from_secs(60));
        assert_eq!(
            result.error_text.as_deref(),
            Some("Process exited with status 3 and no error output")
        );
    }

    #[test]
    fn test_signal_death_synthesizes_message() {
        let result = normalize(Ok(outcome(None, "", "", false)), Duration::from_secs(60));
        assert!(!result.success);
        assert_eq!(
            result.error_text.as_deref(),
            Some("Process was killed by a signal")
        );
    }

    #[test]
    fn test_timeout_message_and_partial_stdout() {
        let result = normalize(
            Ok(outcome(None, "got this far\n", "", true)),
            Duration::from_secs(7),
        );
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::TimeoutExceeded));
        assert_eq!(
            result.error_text.as_deref(),
            Some("Execution timed out after 7 seconds")
        );
        assert_eq!(result.stdout_text, "got this far\n");
    }

    #[test]
    fn test_launch_failure_is_infrastructure() {
        let err = RunnerError::Spawn {
            interpreter: "python3".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let result = normalize(Err(err), Duration::from_secs(60));
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::InfrastructureUnavailable));
        let text = result.error_text.unwrap();
        assert!(text.contains("Analysis engine unavailable"), "was: {text}");
    }

    #[test]
    fn test_single_image_extracted_text_retained() {
        let stdout = "![Chart](data:image/png;base64,QUJD)";
        let result = normalize(Ok(outcome(Some(0), stdout, "", false)), Duration::from_secs(60));
        assert_eq!(result.extracted_artifacts, vec![Artifact::new("QUJD")]);
        assert_eq!(result.stdout_text, stdout);
    }

    #[test]
    fn test_multiple_images_in_order() {
        let stdout = "intro\n![a](data:image/png;base64,QQ==)\ntext\n![b](data:image/png;base64,Qg==)\n";
        let artifacts = extract_artifacts(stdout);
        assert_eq!(
            artifacts,
            vec![Artifact::new("QQ=="), Artifact::new("Qg==")]
        );
    }

    #[test]
    fn test_non_png_data_url_is_not_extracted() {
        let stdout = "![x](data:image/svg+xml;base64,QUJD)";
        assert!(extract_artifacts(stdout).is_empty());
    }
}
