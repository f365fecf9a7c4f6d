//! Small parsers for raw model completions: fence stripping and routing
//! decisions.

use serde::Deserialize;

/// Routing outcome for one user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Answer straight from conversation context, no execution.
    Direct { response: String },
    /// Fresh analysis code must be generated and run.
    NeedsCode,
}

#[derive(Debug, Deserialize)]
struct DecisionJson {
    decision: String,
    #[serde(default)]
    direct_response: Option<String>,
}

/// Parse the decision JSON the model was asked to emit.
///
/// Models wrap JSON in code fences despite instructions, so fences are
/// stripped first. Anything that fails to parse falls back to
/// `NeedsCode` - generating and running code is the safe default, a
/// malformed decision must never drop the query.
pub fn parse_decision(raw: &str) -> Decision {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<DecisionJson>(&cleaned) {
        Ok(parsed) if parsed.decision == "NO_CODE" => {
            let response = parsed
                .direct_response
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| {
                    "I can help with that based on our conversation.".to_string()
                });
            Decision::Direct { response }
        }
        Ok(_) => Decision::NeedsCode,
        Err(err) => {
            tracing::debug!(error = %err, "Decision JSON did not parse, defaulting to code generation");
            Decision::NeedsCode
        }
    }
}

/// Strip markdown code fences from a completion.
///
/// If the text contains a fenced block, return that block's contents;
/// otherwise return the trimmed text unchanged. Only the first block is
/// taken - trailing prose after the fence is commentary, not code.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains("```") {
        return trimmed.to_string();
    }

    let mut inside_block = false;
    let mut collected = Vec::new();
    for line in trimmed.lines() {
        if line.trim_start().starts_with("```") {
            if inside_block {
                break;
            }
            inside_block = true;
            continue;
        }
        if inside_block {
            collected.push(line);
        }
    }

    if collected.is_empty() {
        trimmed.to_string()
    } else {
        collected.join("\n").trim().to_string()
    }
}
