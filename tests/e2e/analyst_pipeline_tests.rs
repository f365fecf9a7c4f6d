//! Full analyst pipeline with a scripted model and a real interpreter.

use crate::common::setup_test_logging;
use crate::skip_without_python;
use anygraph_common::{ColumnInfo, ConversationTurn};
use anygraph_core::Analyst;
use anygraph_llm::ScriptedGenerator;
use anygraph_sandbox::{ExecutionGateway, FailureKind, ProcessRunner};
use assert_matches::assert_matches;
use std::sync::Arc;

const NEEDS_CODE: &str =
    r#"{"decision": "NEEDS_CODE", "reason": "fresh aggregation", "direct_response": null}"#;

fn schema() -> Vec<ColumnInfo> {
    vec![
        ColumnInfo::new("region", "object").with_example("EMEA"),
        ColumnInfo::new("revenue", "float64").with_example("1034.5"),
    ]
}

fn analyst(responses: Vec<&str>) -> Analyst {
    Analyst::new(
        Arc::new(ScriptedGenerator::new(responses)),
        ExecutionGateway::new(ProcessRunner::new()),
    )
}

#[tokio::test]
async fn test_generated_table_code_round_trip() {
    setup_test_logging();
    skip_without_python!();

    let code = "```python\nprint(\"| region | revenue |\")\nprint(\"|---|---|\")\nprint(\"| EMEA | 1034.5 |\")\n```";
    let reply = analyst(vec![NEEDS_CODE, code])
        .answer(
            "revenue by region",
            "https://example.com/sales.csv",
            &schema(),
            &[],
        )
        .await
        .unwrap();

    assert!(reply.execution.as_ref().unwrap().success);
    assert!(reply.response_text.contains("| EMEA | 1034.5 |"));
    assert!(reply.images.is_empty());
    // The persisted code is fence-free and runnable as-is.
    assert!(reply.code.unwrap().starts_with("print("));
}

#[tokio::test]
async fn test_dangerous_generated_code_is_rejected_not_run() {
    setup_test_logging();

    let code = "```python\nimport subprocess\nsubprocess.run([\"ls\"])\n```";
    let reply = analyst(vec![NEEDS_CODE, code])
        .answer("list files", "https://example.com/sales.csv", &schema(), &[])
        .await
        .unwrap();

    let execution = reply.execution.unwrap();
    assert_matches!(execution.failure, Some(FailureKind::ValidationRejected));
    assert!(reply
        .response_text
        .starts_with("Error: Security validation failed:"));
}

#[tokio::test]
async fn test_direct_answer_uses_no_interpreter() {
    setup_test_logging();

    // Broken interpreter proves the direct path never touches the sandbox.
    let analyst = Analyst::new(
        Arc::new(ScriptedGenerator::new([
            r#"{"decision": "NO_CODE", "reason": "in history", "direct_response": "EMEA led with 1034.5."}"#,
        ])),
        ExecutionGateway::new(ProcessRunner::with_interpreter("/nonexistent/python")),
    );

    let history = vec![
        ConversationTurn::user("revenue by region"),
        ConversationTurn::assistant("| EMEA | 1034.5 |"),
    ];
    let reply = analyst
        .answer(
            "which region led?",
            "https://example.com/sales.csv",
            &schema(),
            &history,
        )
        .await
        .unwrap();

    assert_eq!(reply.response_text, "EMEA led with 1034.5.");
    assert!(reply.execution.is_none());
}

#[tokio::test]
async fn test_runtime_error_surfaces_as_chat_error() {
    setup_test_logging();
    skip_without_python!();

    let code = "```python\nprint(\"loaded 10 rows\")\nraise ValueError(\"bad column\")\n```";
    let reply = analyst(vec![NEEDS_CODE, code])
        .answer("sum revenue", "https://example.com/sales.csv", &schema(), &[])
        .await
        .unwrap();

    assert!(reply.response_text.starts_with("Error:"));
    assert!(reply.response_text.contains("ValueError"));
    // Partial stdout is preserved on the execution record for the caller.
    let execution = reply.execution.unwrap();
    assert!(execution.stdout_text.contains("loaded 10 rows"));
}
