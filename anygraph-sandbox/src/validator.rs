//! Pre-execution denylist scan of generated code.
//!
//! This is a coarse lexical filter, not a static analyzer: it scans the
//! literal source text for known-dangerous substrings and cannot catch
//! obfuscated or indirect calls (`getattr(builtins, "ev" + "al")` sails
//! through). The real isolation boundary is the process sandbox in
//! [`crate::runner`]; this filter exists to refuse the obvious cases
//! cheaply, before any process is spawned.

use serde::{Deserialize, Serialize};

/// Outcome of validating one snippet. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum ValidationVerdict {
    Allowed,
    Rejected { reason: String },
}

impl ValidationVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ValidationVerdict::Allowed)
    }
}

/// Denylisted substring and what it would let the snippet do.
const DENYLIST: &[(&str, &str)] = &[
    // Shelling out
    ("import subprocess", "spawns subprocesses"),
    ("from subprocess", "spawns subprocesses"),
    ("os.system", "shells out"),
    ("os.popen", "shells out"),
    // Process-control module imports
    ("import os", "imports a process-control module"),
    ("from os", "imports a process-control module"),
    ("import sys", "imports a process-control module"),
    ("from sys", "imports a process-control module"),
    ("import shutil", "imports a filesystem-control module"),
    ("import socket", "opens raw network sockets"),
    ("importlib", "performs dynamic imports"),
    ("__import__", "performs dynamic imports"),
    // Dynamic evaluation and compilation
    ("eval(", "evaluates dynamic code"),
    ("exec(", "executes dynamic code"),
    ("compile(", "compiles dynamic code"),
    // Raw file and console access
    ("open(", "opens raw file handles"),
    ("input(", "reads interactive input"),
];

/// Scan `source_code` for denylisted constructs.
///
/// Returns `Rejected` naming the first match, in denylist order. No side
/// effects, no I/O, never blocks.
pub fn validate(source_code: &str) -> ValidationVerdict {
    for (token, effect) in DENYLIST {
        if source_code.contains(token) {
            return ValidationVerdict::Rejected {
                reason: format!("code contains '{token}' ({effect})"),
            };
        }
    }
    ValidationVerdict::Allowed
}
