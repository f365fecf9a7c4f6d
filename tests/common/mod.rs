//! Common test utilities shared across integration and E2E tests

use std::sync::Once;

static INIT: Once = Once::new();

/// Setup logging for tests; safe to call from every test.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Whether a python3 interpreter is on PATH. Sandbox tests that execute
/// real snippets skip themselves when it is missing.
pub fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok()
}

/// Skip helper: logs and returns true when the test cannot run here.
#[macro_export]
macro_rules! skip_without_python {
    () => {
        if !$crate::common::python3_available() {
            eprintln!("skipping: python3 not found on PATH");
            return;
        }
    };
}
